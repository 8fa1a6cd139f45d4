//! A `FeatureTypeStyle`: an ordered list of rules sharing one private
//! compositing buffer, its `comp-op`, opacity, and image filter chain (§3,
//! §4.I "style-level compositing").

use core_pixel::{BlendMode, PixelBuffer, PixelFormat, Rgba8};

use crate::rule::Rule;

/// Post-processing filters applied to a style's private buffer before it is
/// composited onto the map, in declared order (§9 supplemented feature:
/// mapnik's `image_filter` chain, dropped from the distilled spec but real
/// functionality the original renderer exposes per-style).
#[derive(Debug, Clone)]
pub enum ImageFilter {
    /// Box blur approximating a Gaussian, `radius` in pixels.
    Blur { radius: u32 },
    Grayscale,
    Invert,
}

impl ImageFilter {
    /// The padding this filter needs on every side of its private buffer so
    /// its own edge pixels sample real data rather than the buffer boundary
    /// (§4.I "private buffer sized main buffer + border = max filter
    /// radius").
    pub fn radius(&self) -> u32 {
        match self {
            ImageFilter::Blur { radius } => *radius,
            ImageFilter::Grayscale | ImageFilter::Invert => 0,
        }
    }

    pub fn apply(&self, buffer: &mut PixelBuffer<Rgba8>) {
        match self {
            ImageFilter::Blur { radius } => box_blur(buffer, *radius),
            ImageFilter::Grayscale => grayscale(buffer),
            ImageFilter::Invert => invert(buffer),
        }
    }
}

/// The largest radius any filter in `filters` needs, i.e. this style's
/// private-buffer border width.
pub fn max_filter_radius(filters: &[ImageFilter]) -> u32 {
    filters.iter().map(ImageFilter::radius).max().unwrap_or(0)
}

fn grayscale(buffer: &mut PixelBuffer<Rgba8>) {
    for p in buffer.pixels_mut() {
        let lum = (0.299 * p.r as f32 + 0.587 * p.g as f32 + 0.114 * p.b as f32).round() as u8;
        p.r = lum;
        p.g = lum;
        p.b = lum;
    }
}

fn invert(buffer: &mut PixelBuffer<Rgba8>) {
    for p in buffer.pixels_mut() {
        // Premultiplied channels invert around their own alpha, not 255, so
        // a half-transparent pixel's inverse stays within [0, a].
        p.r = p.a.saturating_sub(p.r);
        p.g = p.a.saturating_sub(p.g);
        p.b = p.a.saturating_sub(p.b);
    }
}

fn box_blur(buffer: &mut PixelBuffer<Rgba8>, radius: u32) {
    if radius == 0 {
        return;
    }
    let (w, h) = (buffer.width(), buffer.height());
    let src = buffer.clone();
    let r = radius as i64;
    for y in 0..h {
        for x in 0..w {
            let (mut rs, mut gs, mut bs, mut as_) = (0u32, 0u32, 0u32, 0u32);
            let mut count = 0u32;
            for dy in -r..=r {
                for dx in -r..=r {
                    let sx = x as i64 + dx;
                    let sy = y as i64 + dy;
                    if sx < 0 || sy < 0 || sx >= w as i64 || sy >= h as i64 {
                        continue;
                    }
                    if let Some(p) = src.get(sx as u32, sy as u32) {
                        rs += p.r as u32;
                        gs += p.g as u32;
                        bs += p.b as u32;
                        as_ += p.a as u32;
                        count += 1;
                    }
                }
            }
            if count > 0 {
                buffer.set(
                    x,
                    y,
                    Rgba8 {
                        r: (rs / count) as u8,
                        g: (gs / count) as u8,
                        b: (bs / count) as u8,
                        a: (as_ / count) as u8,
                    },
                );
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureTypeStyle {
    pub name: String,
    pub rules: Vec<Rule>,
    pub comp_op: BlendMode,
    pub opacity: f64,
    pub image_filters: Vec<ImageFilter>,
    /// Whether collision-detector placements should be reset between this
    /// style and the next (§4.I "optionally clears the label cache between
    /// layers").
    pub clear_label_cache: bool,
}

impl Default for FeatureTypeStyle {
    fn default() -> Self {
        Self {
            name: String::new(),
            rules: Vec::new(),
            comp_op: BlendMode::SrcOver,
            opacity: 1.0,
            image_filters: Vec::new(),
            clear_label_cache: false,
        }
    }
}

/// Named lookup of a map's styles, referenced by name from each `Layer`
/// (§3 "a map ties together layers and a dictionary of named styles").
#[derive(Debug, Clone, Default)]
pub struct StyleDict {
    styles: std::collections::HashMap<String, FeatureTypeStyle>,
}

impl StyleDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, style: FeatureTypeStyle) {
        self.styles.insert(style.name.clone(), style);
    }

    pub fn get(&self, name: &str) -> Option<&FeatureTypeStyle> {
        self.styles.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_pixel::Color;

    #[test]
    fn grayscale_equalizes_channels() {
        let mut buf: PixelBuffer<Rgba8> = PixelBuffer::new(1, 1);
        buf.set(0, 0, Rgba8 { r: 10, g: 100, b: 200, a: 255 });
        grayscale(&mut buf);
        let p = buf.get(0, 0).unwrap();
        assert_eq!(p.r, p.g);
        assert_eq!(p.g, p.b);
    }

    #[test]
    fn invert_is_involutive_on_opaque_pixels() {
        let mut buf: PixelBuffer<Rgba8> = PixelBuffer::new(1, 1);
        buf.set(0, 0, Rgba8 { r: 10, g: 200, b: 50, a: 255 });
        let original = buf.get(0, 0).unwrap();
        invert(&mut buf);
        invert(&mut buf);
        assert_eq!(buf.get(0, 0).unwrap(), original);
    }

    #[test]
    fn box_blur_zero_radius_is_a_no_op() {
        let mut buf: PixelBuffer<Rgba8> = PixelBuffer::new(2, 2);
        buf.fill(Color::rgb(1, 2, 3).premultiply());
        let before = buf.clone();
        box_blur(&mut buf, 0);
        assert_eq!(buf.pixels(), before.pixels());
    }

    #[test]
    fn max_filter_radius_picks_the_largest() {
        let filters = vec![ImageFilter::Blur { radius: 2 }, ImageFilter::Grayscale, ImageFilter::Blur { radius: 5 }];
        assert_eq!(max_filter_radius(&filters), 5);
    }

    #[test]
    fn style_dict_looks_up_by_name() {
        let mut dict = StyleDict::new();
        dict.insert(FeatureTypeStyle { name: "roads".to_string(), ..Default::default() });
        assert!(dict.get("roads").is_some());
        assert!(dict.get("rivers").is_none());
    }
}
