//! Region registry and marker placement.
//!
//! Markers are never stored with a position: every pass derives it from
//! the region's coordinate and the current viewport.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::Region;
use crate::error::MapError;
use crate::surface::{RenderSurface, Selector, Template, ATTR_INDEX};
use crate::viewport::Viewport;

/// Outcome of a full render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    /// Keys that now have a marker on the surface.
    pub placed: Vec<u32>,
    /// Regions that could not be drawn, with the reason.
    pub skipped: Vec<MapError>,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    regions: Vec<Region>,
}

impl MarkerRegistry {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Replaces the working set.
    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, key: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.key == key)
    }

    /// First region flagged as default.
    pub fn default_region(&self) -> Option<&Region> {
        let mut defaults = self.regions.iter().filter(|r| r.is_default);
        let first = defaults.next();
        if let Some(extra) = defaults.next() {
            warn!(first = ?first.map(|r| r.key), extra = extra.key, "several default regions, using the first");
        }
        first
    }

    /// Creates or updates one marker per renderable region and removes
    /// markers that no longer correspond to a drawable region.
    pub fn render_all<S: RenderSurface>(&self, viewport: &Viewport, surface: &mut S) -> RenderSummary {
        let mut summary = RenderSummary::default();

        for region in &self.regions {
            match self.place(region, viewport, surface) {
                Ok(()) => summary.placed.push(region.key),
                Err(err) => {
                    warn!(key = region.key, name = %region.name, %err, "skipping marker");
                    summary.skipped.push(err);
                }
            }
        }

        let live: HashSet<u32> = summary.placed.iter().copied().collect();
        for el in surface.query(Selector::Markers) {
            let key = surface.attribute(el, ATTR_INDEX).and_then(|v| v.parse::<u32>().ok());
            if !key.is_some_and(|k| live.contains(&k)) {
                debug!(?key, "removing stale marker");
                surface.remove(el);
            }
        }

        summary
    }

    fn place<S: RenderSurface>(
        &self,
        region: &Region,
        viewport: &Viewport,
        surface: &mut S,
    ) -> Result<(), MapError> {
        let point = viewport
            .point_for(region.lat(), region.lng())
            .ok_or(MapError::UnrenderablePoint { key: region.key })?;

        let existing = surface.query(Selector::Marker(region.key));
        if !existing.is_empty() {
            for el in existing {
                surface.set_position(el, point);
            }
            return Ok(());
        }

        let el = surface
            .clone_template(Template::Marker)
            .ok_or(MapError::MissingTemplate(Template::Marker))?;
        surface.set_attribute(el, ATTR_INDEX, region.key.to_string());
        surface.set_position(el, point);
        surface.append(el);
        debug!(key = region.key, x = point.x, y = point.y, "marker created");
        Ok(())
    }

    /// Moves existing markers to their current positions; creates nothing
    /// and leaves classes untouched.
    pub fn reposition_all<S: RenderSurface>(&self, viewport: &Viewport, surface: &mut S) {
        for region in &self.regions {
            let Some(point) = viewport.point_for(region.lat(), region.lng()) else {
                continue;
            };
            for el in surface.query(Selector::Marker(region.key)) {
                surface.set_position(el, point);
            }
        }
    }
}
