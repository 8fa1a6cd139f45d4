//! Pattern source (§3: "a read-only RGBA-8 image accessor with wrap modes
//! (repeat, clamp, clone)"), used by the polygon/line pattern symbolizers
//! (§4.H).

use core_pixel::{PixelBuffer, PixelFormat, Rgba8};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Clamp,
    /// Samples outside the source extent read as transparent, rather than
    /// wrapping or clamping (mapnik's `pattern_source`'s "none"/clone mode
    /// used when a pattern is meant to tile without visible repetition
    /// seams past its own bbox).
    Clone,
}

pub trait PatternSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn sample(&self, x: i64, y: i64, wrap: WrapMode) -> Rgba8;
}

fn wrap_coord(v: i64, extent: u32, mode: WrapMode) -> Option<u32> {
    let extent = extent as i64;
    if extent <= 0 {
        return None;
    }
    match mode {
        WrapMode::Repeat => Some(v.rem_euclid(extent) as u32),
        WrapMode::Clamp => Some(v.clamp(0, extent - 1) as u32),
        WrapMode::Clone => {
            if v >= 0 && v < extent {
                Some(v as u32)
            } else {
                None
            }
        }
    }
}

/// A `PatternSource` backed by an in-memory `PixelBuffer<Rgba8>`.
#[derive(Debug, Clone)]
pub struct ImagePatternSource {
    image: PixelBuffer<Rgba8>,
}

impl ImagePatternSource {
    pub fn new(image: PixelBuffer<Rgba8>) -> Self {
        Self { image }
    }
}

impl PatternSource for ImagePatternSource {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn sample(&self, x: i64, y: i64, wrap: WrapMode) -> Rgba8 {
        let (Some(wx), Some(wy)) = (
            wrap_coord(x, self.image.width(), wrap),
            wrap_coord(y, self.image.height(), wrap),
        ) else {
            return Rgba8::default();
        };
        self.image.get(wx, wy).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_pixel::Color;

    fn checker(size: u32) -> ImagePatternSource {
        let mut img: PixelBuffer<Rgba8> = PixelBuffer::new(size, size);
        img.fill(Color::rgb(10, 20, 30).premultiply());
        ImagePatternSource::new(img)
    }

    #[test]
    fn repeat_wraps_coordinates_around() {
        let src = checker(4);
        assert_eq!(src.sample(4, 0, WrapMode::Repeat), src.sample(0, 0, WrapMode::Repeat));
        assert_eq!(src.sample(-1, 0, WrapMode::Repeat), src.sample(3, 0, WrapMode::Repeat));
    }

    #[test]
    fn clamp_saturates_at_the_edge() {
        let src = checker(4);
        assert_eq!(src.sample(100, 0, WrapMode::Clamp), src.sample(3, 0, WrapMode::Clamp));
    }

    #[test]
    fn clone_leaves_outside_samples_transparent() {
        let src = checker(4);
        assert_eq!(src.sample(10, 10, WrapMode::Clone), Rgba8::default());
    }
}
