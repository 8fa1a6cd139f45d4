//! The renderer (§4.I): the outer layer/style/rule/feature/symbolizer
//! loop, wired from `core-style`'s tree down through `core-convert`,
//! `core-raster`, `core-resample`, `core-marker`, `core-label`, and
//! `core-pixel`. `Renderer` (in `renderer`) is the one type a caller needs.

mod building;
pub mod cancellation;
pub mod dispatch;
mod error;
mod processor;
mod raster_path;
mod renderer;
mod scale;
mod style_buffer;

pub use cancellation::CancellationToken;
pub use error::RenderError;
pub use renderer::{Renderer, RendererSettings};
pub use scale::scale_denominator;
