//! Affine image resampler (§4.E): a selectable reconstruction-filter bank
//! and the affine/mesh warp that drives it. Consumed by core-render's
//! raster symbolizer path (J) to reproject a source raster tile into the
//! current viewport before compositing it through core-pixel.

pub mod filter;
pub mod warp;

pub use filter::{Filter, FilterLut};
pub use warp::{sample_filtered, warp, warp_mesh, DEFAULT_MESH_SIZE};
