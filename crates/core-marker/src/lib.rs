//! Marker and SVG renderer (§4.F): vector markers as attribute-group path
//! trees with solid/gradient paint, bitmap icon compositing, and a
//! process-wide cache for parsed markers.

pub mod bitmap;
pub mod cache;
pub mod gradient;
pub mod vector;

pub use bitmap::{render_bitmap_marker, BitmapMarker};
pub use cache::{MarkerCache, MarkerCacheKey};
pub use gradient::{Gradient, GradientGeometry, GradientLut, GradientStop, GradientUnits};
pub use vector::{render_vector_marker, MarkerAttributeGroup, Paint, Placement, VectorMarker};
