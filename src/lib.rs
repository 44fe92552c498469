//! continent-map — headless core of an interactive world-map widget.
//!
//! Projects region coordinates (Miller projection) onto fixed-size map
//! artwork, fits the artwork into a resizable container, places one marker
//! per region and highlights the selected region's countries with a ring
//! sized by the region's share.
//!
//! The widget draws through the [`RenderSurface`] trait. [`SvgSurface`] is
//! an in-memory implementation that serializes to a standalone SVG file.
//!
//! ```
//! use std::time::Instant;
//! use continent_map::{load_builtin, Frame, SvgSurface, WidgetOptions, WorldMap};
//! use glam::DVec2;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (map, regions) = load_builtin()?;
//! let mut surface = SvgSurface::new(map.width, map.height).with_countries(["US", "CA"]);
//! surface.set_frame_size(Frame::Container, Some(DVec2::new(900.0, 450.0)));
//!
//! let mut widget = WorldMap::new(map, regions.into_regions(), surface, WidgetOptions::default());
//! widget.start(Instant::now());
//! assert_eq!(widget.selected(), Some(1));
//! assert!(widget.surface().to_svg().contains("selected-outer-circle"));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod inset;
pub mod markers;
pub mod projection;
pub mod selection;
pub mod surface;
pub mod svg;
pub mod viewport;
pub mod widget;

pub use config::{load_builtin, BoundingBox, Inset, MapConfig, ProjectionConfig, ProjectionKind, Region, RegionSet};
pub use error::{ConfigError, MapError};
pub use markers::{MarkerRegistry, RenderSummary};
pub use selection::{radius_for_percentage, SelectionController, SelectionState, DEFAULT_RADIUS};
pub use surface::{Frame, RenderSurface, Selector, Template};
pub use svg::{ElementId, SvgSurface};
pub use viewport::{Viewport, ViewportState};
pub use widget::{LayoutState, WidgetOptions, WorldMap};
