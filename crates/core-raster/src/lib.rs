//! Scanline anti-aliased rasterizer (§4.D): cell accumulation, sorting, scan
//! conversion under a filling rule, and gamma correction. Consumes whatever
//! `VertexStream` the core-convert chain hands it (curves must already be
//! flattened) and produces AA coverage spans; core-render blits those
//! through core-pixel's compositor.

pub mod cell;
pub mod fill;
pub mod gamma;
pub mod rasterizer;

pub use fill::FillRule;
pub use gamma::Gamma;
pub use rasterizer::{ClipBox, Rasterizer, Span};
