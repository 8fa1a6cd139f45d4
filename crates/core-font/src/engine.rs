//! The font/face interface the core consumes (§6), and a deterministic stub
//! implementation standing in for the delegated font engine in tests and
//! the demo binary (glyph rasterization itself is out of scope, per
//! spec.md §1's "External collaborators").

use crate::face::{Face, FaceSet};
use crate::glyph::{Glyph, GlyphBitmap};

/// Shapes text into positioned glyphs and rasterizes individual glyphs to
/// coverage bitmaps. A real implementation wraps a system font library;
/// `core-label`'s line/point placement and `core-render`'s text symbolizer
/// only depend on this trait, never on a concrete engine.
pub trait FontEngine {
    fn shape(&self, text: &str, faces: &FaceSet, size: f64) -> Vec<Glyph>;
    fn bitmap(&self, face: &Face, codepoint: u32, size: f64) -> Option<GlyphBitmap>;
}

/// A deterministic stand-in font: every glyph is a solid square whose side
/// is `0.6 * size` pixels and whose advance is `0.65 * size`, except the
/// space codepoint (`' '`, 0x20) which has zero coverage and `0.3 * size`
/// advance. No system font dependency, no non-determinism — label placement
/// tests and the `map-bin` demo render reproducible output across machines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubFontEngine;

impl StubFontEngine {
    const ADVANCE_FACTOR: f64 = 0.65;
    const GLYPH_FACTOR: f64 = 0.6;
    const SPACE_ADVANCE_FACTOR: f64 = 0.3;
}

impl FontEngine for StubFontEngine {
    fn shape(&self, text: &str, faces: &FaceSet, size: f64) -> Vec<Glyph> {
        if faces.is_empty() {
            tracing::warn!(target: "font", "shape called with an empty face set");
        }
        text.chars()
            .map(|ch| {
                let codepoint = ch as u32;
                let advance = if ch == ' ' {
                    size * Self::SPACE_ADVANCE_FACTOR
                } else {
                    size * Self::ADVANCE_FACTOR
                };
                Glyph { codepoint, advance, bearing: (0.0, -size * 0.8) }
            })
            .collect()
    }

    fn bitmap(&self, _face: &Face, codepoint: u32, size: f64) -> Option<GlyphBitmap> {
        if codepoint == ' ' as u32 {
            return Some(GlyphBitmap { width: 0, rows: 0, pitch: 0, buffer: Vec::new() });
        }
        let side = (size * Self::GLYPH_FACTOR).round().max(1.0) as u32;
        Some(GlyphBitmap {
            width: side,
            rows: side,
            pitch: side,
            buffer: vec![255u8; (side * side) as usize],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_returns_one_glyph_per_char_with_a_space_gap() {
        let engine = StubFontEngine;
        let faces = FaceSet::single(Face::new("demo"));
        let glyphs = engine.shape("ab c", &faces, 16.0);
        assert_eq!(glyphs.len(), 4);
        assert!(glyphs[2].advance < glyphs[0].advance);
    }

    #[test]
    fn bitmap_side_scales_with_size() {
        let engine = StubFontEngine;
        let face = Face::new("demo");
        let small = engine.bitmap(&face, 'A' as u32, 10.0).unwrap();
        let large = engine.bitmap(&face, 'A' as u32, 20.0).unwrap();
        assert!(large.width > small.width);
        assert!(small.buffer.iter().all(|&b| b == 255));
    }

    #[test]
    fn space_bitmap_is_empty() {
        let engine = StubFontEngine;
        let face = Face::new("demo");
        let bmp = engine.bitmap(&face, ' ' as u32, 16.0).unwrap();
        assert_eq!(bmp.width, 0);
        assert_eq!(bmp.buffer.len(), 0);
    }
}
