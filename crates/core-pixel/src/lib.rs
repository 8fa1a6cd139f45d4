//! Pixel storage and compositing (§4.A): typed pixel buffers, the
//! premultiplied-alpha discipline, and the full Porter-Duff + Photoshop-style
//! blend-mode table.

pub mod blend;
pub mod buffer;
pub mod color;
pub mod format;

pub use blend::{composite, BlendMode};
pub use buffer::{PixelBuffer, RenderView};
pub use color::{parse_css_color, Color, ColorParseError};
pub use format::{Gray16, Gray8, GrayF32, PixelFormat, Rgba8};
