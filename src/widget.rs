//! The map widget: owns the viewport, the region registry, the selection
//! and the render surface, and sequences them in response to host events.
//!
//! The widget is single-threaded and never sleeps. The host forwards
//! events (`on_resize`, `on_click`) and calls [`WorldMap::tick`] from its
//! timer loop; every deferred step is a deadline checked against the `now`
//! the host passes in.

use std::time::{Duration, Instant};

use glam::DVec2;
use tracing::{debug, info, warn};

use crate::config::{MapConfig, Region};
use crate::error::MapError;
use crate::markers::{MarkerRegistry, RenderSummary};
use crate::selection::{SelectionController, SelectionState};
use crate::surface::{Frame, RenderSurface, Selector};
use crate::viewport::{Viewport, ViewportState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetOptions {
    /// Resize events closer together than this are coalesced.
    pub resize_quiet_period: Duration,
    /// Delay between attempts to measure an unlaid-out container.
    pub retry_delay: Duration,
    /// Attempts after the first before giving up until the next resize.
    pub max_retries: u32,
    /// Horizontal padding subtracted from the container before the canvas
    /// is scaled to fit.
    pub canvas_gutter: f64,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            resize_quiet_period: Duration::from_millis(20),
            retry_delay: Duration::from_millis(50),
            max_retries: 20,
            canvas_gutter: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// Waiting for the container to get a size.
    NotReady { attempts: u32 },
    Ready,
    /// Retries ran out; the next resize event starts over.
    Abandoned,
}

pub struct WorldMap<S: RenderSurface> {
    viewport: Viewport,
    markers: MarkerRegistry,
    selection: SelectionController,
    surface: S,
    options: WidgetOptions,
    layout: LayoutState,
    retry_at: Option<Instant>,
    resize_at: Option<Instant>,
}

impl<S: RenderSurface> WorldMap<S> {
    pub fn new(map: MapConfig, regions: Vec<Region>, surface: S, options: WidgetOptions) -> Self {
        Self {
            viewport: Viewport::new(map),
            markers: MarkerRegistry::new(regions),
            selection: SelectionController::new(),
            surface,
            options,
            layout: LayoutState::NotReady { attempts: 0 },
            retry_at: None,
            resize_at: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn viewport(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn selected(&self) -> Option<u32> {
        self.selection.selected()
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn regions(&self) -> &[Region] {
        self.markers.regions()
    }

    pub fn state(&self) -> LayoutState {
        self.layout
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Next instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.retry_at, self.resize_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// First layout attempt. Renders and applies the default selection when
    /// the container is measurable, otherwise schedules a retry.
    pub fn start(&mut self, now: Instant) {
        if self.layout != LayoutState::Ready {
            self.try_attach(now);
        }
    }

    /// Runs whatever deferred work is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.retry_at.is_some_and(|t| now >= t) {
            self.retry_at = None;
            self.try_attach(now);
        }
        if self.resize_at.is_some_and(|t| now >= t) {
            self.resize_at = None;
            self.apply_resize(now);
        }
    }

    /// Records a resize event; any pending one is replaced.
    pub fn on_resize(&mut self, now: Instant) {
        self.resize_at = Some(now + self.options.resize_quiet_period);
    }

    /// Selects the clicked region. Unknown or undrawn keys are ignored.
    pub fn on_click(&mut self, key: u32) {
        if self.layout != LayoutState::Ready {
            debug!(key, "click before layout, ignored");
            return;
        }
        let Some(region) = self.markers.get(key) else {
            let err = MapError::UnknownRegion(key);
            debug!(%err, "click ignored");
            return;
        };
        if let Err(err) = self.selection.select(region, &mut self.surface) {
            debug!(key, %err, "click ignored");
        }
    }

    /// Replaces the region set and redraws if laid out. The current
    /// selection is kept when its region survives, otherwise the default
    /// region is selected. With neither drawable the widget is left
    /// unselected and every highlight is cleared.
    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.markers.set_regions(regions);
        if self.layout != LayoutState::Ready {
            return;
        }
        self.render();
        let surface = &self.surface;
        let drawn = |r: &&Region| surface.query_one(Selector::Marker(r.key)).is_some();
        let keep = self.selection.selected().and_then(|k| self.markers.get(k)).filter(drawn);
        match keep.or_else(|| self.markers.default_region()) {
            Some(region) => {
                if let Err(err) = self.selection.select(region, &mut self.surface) {
                    warn!(%err, "selection lost after region update");
                    self.selection.clear(&mut self.surface);
                }
            }
            None => {
                debug!("no default region after update, clearing selection");
                self.selection.clear(&mut self.surface);
            }
        }
    }

    /// Full render pass over the current region set.
    pub fn render(&mut self) -> RenderSummary {
        let summary = self.markers.render_all(&self.viewport, &mut self.surface);
        self.selection.refresh(&mut self.surface);
        summary
    }

    /// Zooms to a multiple of the base fit and repositions markers.
    pub fn zoom_to(&mut self, zoom: f64) {
        if self.layout == LayoutState::Ready {
            self.viewport.zoom_to(zoom);
            self.reposition();
        }
    }

    /// Pans by a delta in canvas pixels and repositions markers.
    pub fn pan_by(&mut self, delta: DVec2) {
        if self.layout == LayoutState::Ready {
            self.viewport.pan_by(delta);
            self.reposition();
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn measure(&mut self) -> Result<(), MapError> {
        let size = self.surface.frame_size(Frame::Container);
        self.viewport.update_size(size)
    }

    fn try_attach(&mut self, now: Instant) {
        match self.measure() {
            Ok(()) => {
                self.layout = LayoutState::Ready;
                self.retry_at = None;
                let vp = self.viewport.state();
                info!(width = vp.container.x, height = vp.container.y, "map laid out");

                self.fit_canvas();
                let summary = self.render();
                debug!(placed = summary.placed.len(), skipped = summary.skipped.len(), "initial render");
                self.select_default();
            }
            Err(err) => {
                let attempts = match self.layout {
                    LayoutState::NotReady { attempts } => attempts + 1,
                    _ => 1,
                };
                if attempts > self.options.max_retries {
                    let err = MapError::RetriesExhausted { attempts };
                    warn!(%err, "giving up until the next resize");
                    self.layout = LayoutState::Abandoned;
                    self.retry_at = None;
                } else {
                    debug!(attempts, %err, "container not ready, retrying");
                    self.layout = LayoutState::NotReady { attempts };
                    self.retry_at = Some(now + self.options.retry_delay);
                }
            }
        }
    }

    fn apply_resize(&mut self, now: Instant) {
        match self.layout {
            LayoutState::Ready => match self.measure() {
                Ok(()) => {
                    self.fit_canvas();
                    self.reposition();
                }
                Err(err) => warn!(%err, "resize ignored, keeping previous transform"),
            },
            LayoutState::Abandoned => {
                self.layout = LayoutState::NotReady { attempts: 0 };
                self.try_attach(now);
            }
            // A retry is already scheduled.
            LayoutState::NotReady { .. } => {}
        }
    }

    /// Sizes the canvas frame to the artwork scaled across the container
    /// width. The ring radius is derived from the resulting height.
    fn fit_canvas(&mut self) {
        match self.viewport.canvas_fit(self.options.canvas_gutter) {
            Some(size) => {
                debug!(width = size.x, height = size.y, "canvas fitted");
                self.surface.resize_frame(Frame::Canvas, size);
            }
            None => debug!("container narrower than the gutter, canvas left as is"),
        }
    }

    fn reposition(&mut self) {
        self.markers.reposition_all(&self.viewport, &mut self.surface);
        self.selection.refresh(&mut self.surface);
    }

    fn select_default(&mut self) {
        let Some(region) = self.markers.default_region() else {
            debug!("no default region, staying unselected");
            return;
        };
        if let Err(err) = self.selection.select(region, &mut self.surface) {
            warn!(%err, "default region could not be selected");
        }
    }
}
