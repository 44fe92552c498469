//! Miller cylindrical projection.
//!
//! Maps a `(lat, lng)` pair onto the planar coordinates used by the inset
//! bounding boxes of the map artwork. Output units are metres on the
//! projection plane, with y growing southwards.

use glam::DVec2;

/// Planet radius used by the artwork the insets were measured against.
pub const RADIUS: f64 = 6_381_372.0;

// Miller: y = 5/4 * ln(tan(pi/4 + 2/5 * lat)), written as 0.4 / 0.8.
const LAT_SCALE: f64 = 0.4;
const LAT_DIVISOR: f64 = 0.8;

/// Moves a longitude east of the configured antimeridian by a full turn so
/// points stay continuous relative to `central_meridian`.
#[inline]
pub fn normalize_longitude(lng: f64, central_meridian: f64) -> f64 {
    if lng < -180.0 + central_meridian {
        lng + 360.0
    } else {
        lng
    }
}

/// Projects `(lat, lng)` in degrees onto the plane.
///
/// Latitudes at the pole singularity produce non-finite coordinates; callers
/// treat those as unrenderable rather than an error.
#[inline]
pub fn project(lat: f64, lng: f64, central_meridian: f64) -> DVec2 {
    let lng = normalize_longitude(lng, central_meridian);
    let rad = std::f64::consts::PI / 180.0;
    DVec2::new(
        RADIUS * (lng - central_meridian) * rad,
        -RADIUS * ((45.0 + LAT_SCALE * lat) * rad).tan().ln() / LAT_DIVISOR,
    )
}
