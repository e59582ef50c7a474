//! Spherical (Web) Mercator forward projection.
//!
//! Output is in projection-radian units with no scale or origin offset. It is
//! only meaningful for relative plot extents.

/// Latitude at which Web Mercator becomes square; beyond it `y` grows
/// without bound.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Project `(lat, lon)` in degrees to planar `(x, y)`.
///
/// `y = ln(tan(π/4 + φ/2))`, evaluated as `asinh(tan φ)` so the equator maps
/// to exactly zero. Unclamped: near ±90° latitude `y` grows without bound.
pub fn project(lat: f64, lon: f64) -> (f64, f64) {
    let x = lon.to_radians();
    let y = lat.to_radians().tan().asinh();
    (x, y)
}

/// Like [`project`], with latitude clamped to ±[`MAX_MERCATOR_LAT`] so the
/// result is always finite. Used for everything that ends up on a canvas.
pub fn project_clamped(lat: f64, lon: f64) -> (f64, f64) {
    project(lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT), lon)
}
