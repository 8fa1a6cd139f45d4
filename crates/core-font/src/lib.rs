//! Font/face interface (§6, consumed). Glyph rasterization itself is
//! delegated to an external font engine (spec.md §1's out-of-scope list);
//! this crate only pins down the `shape`/`bitmap` contract core-label and
//! core-render build text/shield symbolizers against, plus a deterministic
//! stub implementation for tests and the demo binary.

pub mod engine;
pub mod face;
pub mod glyph;

pub use engine::{FontEngine, StubFontEngine};
pub use face::{Face, FaceSet};
pub use glyph::{Glyph, GlyphBitmap};
