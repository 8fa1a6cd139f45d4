//! Scale denominator (§4.I rule scale-window gating), grounded on mapnik's
//! `ctrans.hpp`: a map's ground resolution expressed as a dimensionless
//! denominator so a rule's `min-scale-denominator`/`max-scale-denominator`
//! can be compared against it regardless of projection units.

/// `0.00028` m/px is the OGC/mapnik-standard "standardized rendering pixel
/// size" used to turn ground resolution into a scale denominator.
const STANDARDIZED_PIXEL_SIZE_METERS: f64 = 0.00028;

/// `geo_width / width_px` is the ground distance one pixel covers; dividing
/// by the standardized pixel size yields the scale denominator (the `N` in
/// `1:N`).
pub fn scale_denominator(geo_width: f64, width_px: u32) -> f64 {
    if width_px == 0 {
        return f64::INFINITY;
    }
    (geo_width / width_px as f64) / STANDARDIZED_PIXEL_SIZE_METERS
}
