//! Viewport transform: fits the artwork into the container and maps
//! geographic coordinates to canvas pixels.
//!
//! The transform has two layers. The base fit (`base_scale`,
//! `base_translate`) makes the artwork fill the container on its tighter
//! axis. The user layer (`scale`, `translate`) starts equal to the base fit
//! and is rescaled with it on every resize, so zoom and pan survive a
//! container change without a visual jump. Translation is expressed in
//! artwork units and multiplied by `scale` when placing points.

use glam::DVec2;
use tracing::debug;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::inset::{inset_fraction, resolve_inset};
use crate::projection::project;

/// Snapshot of the current transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub container: DVec2,
    pub scale: f64,
    pub translate: DVec2,
    pub base_scale: f64,
    pub base_translate: DVec2,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            container: DVec2::ZERO,
            scale: 1.0,
            translate: DVec2::ZERO,
            base_scale: 1.0,
            base_translate: DVec2::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    map: MapConfig,
    state: ViewportState,
}

impl Viewport {
    pub fn new(map: MapConfig) -> Self {
        Self { map, state: ViewportState::default() }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn map(&self) -> &MapConfig {
        &self.map
    }

    /// True once a non-degenerate container size has been applied.
    pub fn is_laid_out(&self) -> bool {
        self.state.container.x > 0.0 && self.state.container.y > 0.0
    }

    /// Applies a freshly measured container size, then refits and clamps.
    ///
    /// A missing, zero or non-finite size leaves the state untouched and
    /// reports [`MapError::NotLaidOut`] so the caller can retry later.
    pub fn update_size(&mut self, size: Option<DVec2>) -> Result<(), MapError> {
        let size = size
            .filter(|s| s.is_finite() && s.x > 0.0 && s.y > 0.0)
            .ok_or(MapError::NotLaidOut)?;
        self.state.container = size;
        self.recompute_base_fit();
        self.clamp_translate();
        Ok(())
    }

    /// Chooses width- or height-fit and carries the user layer along.
    pub fn recompute_base_fit(&mut self) {
        let container = self.state.container;
        let native = self.map.native_size();
        let previous = self.state.base_scale;

        let s = &mut self.state;
        if container.x / container.y > native.x / native.y {
            s.base_scale = container.y / native.y;
            s.base_translate = DVec2::new(
                (container.x - native.x * s.base_scale).abs() / (2.0 * s.base_scale),
                0.0,
            );
        } else {
            s.base_scale = container.x / native.x;
            s.base_translate = DVec2::new(
                0.0,
                (container.y - native.y * s.base_scale).abs() / (2.0 * s.base_scale),
            );
        }

        let ratio = s.base_scale / previous;
        let scale = s.scale * ratio;
        if drawable_scale(scale, native) {
            s.scale = scale;
            s.translate *= ratio;
        } else {
            // The user layer overflowed; fall back to the plain fit.
            s.scale = s.base_scale;
            s.translate = s.base_translate;
        }
        debug!(base_scale = s.base_scale, scale = s.scale, "recomputed base fit");
    }

    /// Keeps the artwork covering the container on axes where it is larger,
    /// and centred on axes where it is smaller.
    pub fn clamp_translate(&mut self) {
        let native = self.map.native_size();
        let s = &mut self.state;
        s.translate = DVec2::new(
            clamp_axis(s.translate.x, s.container.x, native.x, s.scale),
            clamp_axis(s.translate.y, s.container.y, native.y, s.scale),
        );
    }

    /// Sets the user zoom as a multiple of the base fit. Factors that are
    /// not positive, or that would blow the artwork up past `f64` range,
    /// are ignored.
    pub fn zoom_to(&mut self, zoom: f64) {
        let scale = self.state.base_scale * zoom;
        if !(zoom > 0.0 && drawable_scale(scale, self.map.native_size())) {
            debug!(zoom, "zoom factor rejected");
            return;
        }
        self.state.scale = scale;
        self.clamp_translate();
    }

    /// Pans by a delta in canvas pixels.
    pub fn pan_by(&mut self, delta: DVec2) {
        if !delta.is_finite() {
            return;
        }
        self.state.translate += delta / self.state.scale;
        self.clamp_translate();
    }

    /// Size of the rendered canvas: the artwork scaled to the container
    /// width less `gutter`, keeping its aspect ratio. `None` until laid out
    /// or when the gutter eats the whole width.
    pub fn canvas_fit(&self, gutter: f64) -> Option<DVec2> {
        let width = self.state.container.x - gutter;
        if !(self.is_laid_out() && width > 0.0) {
            return None;
        }
        let native = self.map.native_size();
        Some(native * (width / native.x))
    }

    /// Projects a geographic coordinate to canvas pixels, or `None` when it
    /// lands outside every inset.
    pub fn point_for(&self, lat: f64, lng: f64) -> Option<DVec2> {
        if !(lat.is_finite() && lng.is_finite()) {
            return None;
        }
        let plane = project(lat, lng, self.map.projection.central_meridian);
        let inset = resolve_inset(plane, &self.map.insets)?;
        let s = &self.state;

        let local = inset_fraction(plane, inset) * DVec2::new(inset.width, inset.height) * s.scale;
        Some(local + s.translate * s.scale + DVec2::new(inset.left, inset.top) * s.scale)
    }
}

/// Positive, with the scaled artwork still finite on both axes.
fn drawable_scale(scale: f64, native: DVec2) -> bool {
    scale > 0.0 && (native * scale).is_finite()
}

fn clamp_axis(translate: f64, container: f64, artwork: f64, scale: f64) -> f64 {
    if !(scale > 0.0 && scale.is_finite()) {
        return translate;
    }
    let slack = container - artwork * scale;
    if slack >= 0.0 {
        slack / (2.0 * scale)
    } else {
        translate.clamp(slack / scale, 0.0)
    }
}
