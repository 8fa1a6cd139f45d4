//! The public entry point a tile server would embed (§4.I, §9 "a renderer
//! trait instead of CRTP" redesign — `Renderer` is a plain struct since
//! Rust needs no base class to be embeddable, just a value with a method).

use core_font::FontEngine;
use core_pixel::{Color, PixelBuffer, Rgba8};
use core_style::Map;
use crossbeam_channel::Receiver;

use crate::cancellation::CancellationToken;
use crate::error::RenderError;
use crate::processor::render_map;

/// Render-wide settings a caller rarely needs to change per call (§9
/// supplemented ambient concern: mirrors `core-config`'s render section).
#[derive(Debug, Clone, Copy)]
pub struct RendererSettings {
    pub curve_tolerance: f64,
    /// Default gamma LUT applied to every fill (§4.D), sourced from
    /// `core-config`'s `[raster] gamma_power` when a caller loads one.
    pub gamma: core_raster::Gamma,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self { curve_tolerance: 0.25, gamma: core_raster::Gamma::default() }
    }
}

pub struct Renderer<'a> {
    pub fonts: &'a dyn FontEngine,
    pub settings: RendererSettings,
}

impl<'a> Renderer<'a> {
    pub fn new(fonts: &'a dyn FontEngine) -> Self {
        Self { fonts, settings: RendererSettings::default() }
    }

    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Renders `map` to a fresh premultiplied RGBA-8 buffer, filled with the
    /// map's background color (or transparent, if none) before any layer is
    /// drawn (§4.I step 0).
    pub fn render(&self, map: &Map) -> Result<PixelBuffer<Rgba8>, RenderError> {
        self.render_cancellable(map, None)
    }

    /// As `render`, but checked for cancellation between features via
    /// `cancel_rx` (§5).
    pub fn render_cancellable(&self, map: &Map, cancel_rx: Option<Receiver<()>>) -> Result<PixelBuffer<Rgba8>, RenderError> {
        if map.width == 0 || map.height == 0 {
            return Err(RenderError::EmptyCanvas);
        }
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(map.width, map.height);
        target.set_premultiplied_flag(false);
        target.fill(map.background.unwrap_or(Color::rgba(0, 0, 0, 0)));
        target.premultiply();

        let view = core_convert::view_affine(
            map.extent.min_x,
            map.extent.min_y,
            map.extent.max_x,
            map.extent.max_y,
            map.width as f64,
            map.height as f64,
            1.0,
        );

        let token = match cancel_rx {
            Some(rx) => CancellationToken::new(rx),
            None => CancellationToken::none(),
        };

        render_map(map, view, &mut target, self.fonts, self.settings.curve_tolerance, self.settings.gamma, &token)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_font::StubFontEngine;

    #[test]
    fn render_rejects_a_zero_sized_map() {
        let map = Map::new(0, 10);
        let fonts = StubFontEngine;
        let renderer = Renderer::new(&fonts);
        assert!(matches!(renderer.render(&map), Err(RenderError::EmptyCanvas)));
    }

    #[test]
    fn render_fills_the_background_color_with_no_layers() {
        let map = Map::new(8, 8).with_background(Color::rgb(10, 20, 30));
        let fonts = StubFontEngine;
        let renderer = Renderer::new(&fonts);
        let image = renderer.render(&map).unwrap();
        let p = image.get(4, 4).unwrap();
        assert_eq!(p.a, 255);
        assert!(p.r > 0);
    }
}
