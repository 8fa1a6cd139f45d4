//! Geometry data model: the vertex command alphabet, the single-pass vertex
//! stream contract, the geometry tagged union, and features.
//!
//! Every other component in the workspace either produces a `VertexStream`
//! (this crate's geometries) or consumes/wraps one (core-convert,
//! core-raster). Keeping that contract in its own crate with no downstream
//! dependencies lets it be shared by the datasource, style, and render
//! crates without a dependency cycle.

pub mod feature;
pub mod geometry;
pub mod value;
pub mod vertex;

pub use feature::{Feature, RasterTile};
pub use geometry::{BBox, CachedGeometry, Geometry, PolygonRings, Ring};
pub use value::Value;
pub use vertex::{Command, VecStream, VertexStream};
