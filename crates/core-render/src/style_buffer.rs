//! A style's private compositing buffer (§4.I): sized to the main buffer
//! plus a border wide enough for its image filter chain's largest support
//! radius, so a blur near the tile edge samples real (if still local)
//! pixels instead of running off a buffer boundary mid-filter.

use core_pixel::{PixelBuffer, Rgba8};
use core_style::ImageFilter;

pub fn image_filter_border(filters: &[ImageFilter]) -> u32 {
    core_style::max_filter_radius(filters)
}

pub struct StyleBuffer {
    buffer: PixelBuffer<Rgba8>,
}

impl StyleBuffer {
    pub fn new(width: u32, height: u32, border: u32) -> Self {
        let mut buffer = PixelBuffer::new(width + 2 * border, height + 2 * border);
        buffer.set_premultiplied_flag(true);
        Self { buffer }
    }

    pub fn buffer(&self) -> &PixelBuffer<Rgba8> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer<Rgba8> {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_dimensions_include_the_border_on_both_sides() {
        let sb = StyleBuffer::new(100, 50, 4);
        assert_eq!(sb.buffer().width(), 108);
        assert_eq!(sb.buffer().height(), 58);
    }
}
