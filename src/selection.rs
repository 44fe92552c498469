//! Region selection and the proportional highlight ring.

use tracing::{info, warn};

use crate::config::Region;
use crate::error::MapError;
use crate::surface::{
    Frame, RenderSurface, Selector, Template, ATTR_INDEX, ATTR_PERCENTAGE, ATTR_R, CLASS_SELECTED,
};

/// Ring radius used when the weight is missing, non-numeric or not positive.
pub const DEFAULT_RADIUS: f64 = 8.0;

/// Canvas height assumed when the surface has no canvas frame.
pub const FALLBACK_CANVAS_HEIGHT: f64 = 300.0;

/// Parses a weight; anything that is not a number becomes NaN.
pub fn parse_percentage(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

/// Radius of the highlight ring: a third of the canvas height, scaled by
/// the region's share.
pub fn radius_for_percentage(percentage: f64, canvas_height: f64) -> f64 {
    if !percentage.is_finite() || percentage <= 0.0 {
        return DEFAULT_RADIUS;
    }
    let radius = canvas_height / 3.0 * percentage / 100.0;
    if radius > 0.0 {
        radius
    } else {
        DEFAULT_RADIUS
    }
}

fn canvas_height<S: RenderSurface>(surface: &S) -> f64 {
    surface.frame_size(Frame::Canvas).map_or(FALLBACK_CANVAS_HEIGHT, |s| s.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected(u32),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<u32> {
        match self.state {
            SelectionState::Selected(key) => Some(key),
            SelectionState::Unselected => None,
        }
    }

    /// Moves the selection to `region`.
    ///
    /// Fails without touching the surface when the region has no marker
    /// (it was unrenderable). A missing ring template only skips the ring.
    pub fn select<S: RenderSurface>(&mut self, region: &Region, surface: &mut S) -> Result<(), MapError> {
        let marker = surface
            .query_one(Selector::Marker(region.key))
            .ok_or(MapError::UnrenderablePoint { key: region.key })?;

        clear_highlights(surface);
        surface.add_class(marker, CLASS_SELECTED);

        match surface.clone_template(Template::OuterRing) {
            Some(ring) => {
                let radius = radius_for_percentage(region.percentage, canvas_height(surface));
                surface.set_attribute(ring, ATTR_INDEX, region.key.to_string());
                if let Some(center) = surface.position(marker) {
                    surface.set_position(ring, center);
                }
                surface.set_attribute(ring, ATTR_PERCENTAGE, region.percentage.to_string());
                surface.set_attribute(ring, ATTR_R, radius.to_string());
                surface.append(ring);
            }
            None => {
                let err = MapError::MissingTemplate(Template::OuterRing);
                warn!(key = region.key, %err, "selection without highlight ring");
            }
        }

        for code in &region.countries {
            for shape in surface.query(Selector::Country(code)) {
                surface.add_class(shape, CLASS_SELECTED);
            }
        }

        self.state = SelectionState::Selected(region.key);
        info!(key = region.key, name = %region.name, "region selected");
        Ok(())
    }

    /// Drops every highlight and returns to `Unselected`.
    pub fn clear<S: RenderSurface>(&mut self, surface: &mut S) {
        clear_highlights(surface);
        if let SelectionState::Selected(key) = std::mem::take(&mut self.state) {
            info!(key, "selection cleared");
        }
    }

    /// Re-centres the ring on its marker and resizes it for the current
    /// canvas height. Used after the layout changed.
    pub fn refresh<S: RenderSurface>(&self, surface: &mut S) {
        let Some(key) = self.selected() else { return };
        let center = surface
            .query_one(Selector::Marker(key))
            .and_then(|m| surface.position(m));
        let height = canvas_height(surface);

        for ring in surface.query(Selector::OuterRings) {
            let percentage = surface
                .attribute(ring, ATTR_PERCENTAGE)
                .map_or(f64::NAN, |raw| parse_percentage(&raw));
            surface.set_attribute(ring, ATTR_R, radius_for_percentage(percentage, height).to_string());
            if let Some(center) = center {
                surface.set_position(ring, center);
            }
        }
    }
}

fn clear_highlights<S: RenderSurface>(surface: &mut S) {
    for el in surface.query(Selector::Markers) {
        surface.remove_class(el, CLASS_SELECTED);
    }
    for ring in surface.query(Selector::OuterRings) {
        surface.remove(ring);
    }
    for shape in surface.query(Selector::Countries) {
        surface.remove_class(shape, CLASS_SELECTED);
    }
}
