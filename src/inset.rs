//! Inset lookup for projected points.

use glam::DVec2;

use crate::config::Inset;

/// Returns the first inset whose bounding box strictly contains `point`.
///
/// NaN coordinates never compare inside a box, so points past the projection
/// singularity resolve to `None` as well.
pub fn resolve_inset(point: DVec2, insets: &[Inset]) -> Option<&Inset> {
    insets.iter().find(|inset| inset.bbox.contains(point))
}

/// Position of `point` inside `inset`, as fractions of the bounding box.
#[inline]
pub fn inset_fraction(point: DVec2, inset: &Inset) -> DVec2 {
    (point - inset.bbox.min) / inset.bbox.size()
}
