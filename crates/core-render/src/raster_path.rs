//! Component J: the raster symbolizer path. Reprojects a feature's raster
//! tile from its own pixel space into the current view through
//! `core-resample`, then composites the result through `core-pixel` (§4.E,
//! §4.H "Raster").

use core_geom::Feature;
use core_pixel::{composite, Color, PixelBuffer, Rgba8};
use core_resample::warp;
use core_style::RasterSymbolizer;
use glam::{Affine2, Vec2};

use crate::dispatch::RenderContext;

fn to_pixel_buffer(tile: &core_geom::feature::RasterTile) -> PixelBuffer<Rgba8> {
    let mut buffer: PixelBuffer<Rgba8> = PixelBuffer::new(tile.width, tile.height);
    buffer.set_premultiplied_flag(false);
    for y in 0..tile.height {
        for x in 0..tile.width {
            let i = ((y * tile.width + x) * 4) as usize;
            let straight = Color { r: tile.rgba[i], g: tile.rgba[i + 1], b: tile.rgba[i + 2], a: tile.rgba[i + 3], premultiplied: false };
            let premul = straight.premultiply();
            buffer.set(x, y, Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a });
        }
    }
    buffer.set_premultiplied_flag(true);
    buffer
}

/// The affine from the tile's own pixel space (row 0 at its extent's north
/// edge) to the current view's screen space.
fn tile_to_screen(tile: &core_geom::feature::RasterTile, view: Affine2) -> Affine2 {
    let extent = tile.extent;
    let pixel_to_geo = Affine2::from_scale_angle_translation(
        Vec2::new(
            ((extent.max_x - extent.min_x) / tile.width.max(1) as f64) as f32,
            (-(extent.max_y - extent.min_y) / tile.height.max(1) as f64) as f32,
        ),
        0.0,
        Vec2::new(extent.min_x as f32, extent.max_y as f32),
    );
    view * pixel_to_geo
}

pub fn render_raster(sym: &RasterSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(tile) = feature.raster() else { return };
    let src = to_pixel_buffer(tile);
    let affine = tile_to_screen(tile, ctx.view);

    // Destination footprint in screen space, clipped to the output buffer.
    let corners = [
        affine.transform_point2(Vec2::new(0.0, 0.0)),
        affine.transform_point2(Vec2::new(tile.width as f32, 0.0)),
        affine.transform_point2(Vec2::new(0.0, tile.height as f32)),
        affine.transform_point2(Vec2::new(tile.width as f32, tile.height as f32)),
    ];
    let min_x = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let min_y = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(ctx.target.width() as f32) as u32;
    let max_y = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(ctx.target.height() as f32) as u32;
    if max_x <= min_x || max_y <= min_y {
        return;
    }
    let dest_w = max_x - min_x;
    let dest_h = max_y - min_y;

    let local_affine = Affine2::from_translation(Vec2::new(-(min_x as f32), -(min_y as f32))) * affine;
    let mut dest: PixelBuffer<Rgba8> = PixelBuffer::new(dest_w, dest_h);
    warp(&mut dest, &src, local_affine, sym.scaling, None);

    composite(ctx.target, &dest, sym.common.comp_op, sym.common.opacity, min_x as i64, min_y as i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::geometry::BBox;
    use core_label::CollisionDetector;

    #[test]
    fn raster_feature_without_a_tile_is_a_no_op() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(16, 16);
        let mut collision = CollisionDetector::new();
        let fonts = core_font::StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 16.0, 16.0, 16.0, 16.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let feature = Feature::new(1);
        render_raster(&RasterSymbolizer::default(), &feature, &mut ctx);
        assert_eq!(ctx.target.get(8, 8).unwrap().a, 0);
    }

    #[test]
    fn raster_feature_covering_the_whole_view_paints_every_pixel() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(16, 16);
        let mut collision = CollisionDetector::new();
        let fonts = core_font::StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 16.0, 16.0, 16.0, 16.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let tile = core_geom::feature::RasterTile {
            width: 4,
            height: 4,
            rgba: vec![200u8, 50, 50, 255].repeat(16),
            extent: BBox { min_x: 0.0, min_y: 0.0, max_x: 16.0, max_y: 16.0 },
        };
        let feature = Feature::new(1).with_raster(tile);
        render_raster(&RasterSymbolizer::default(), &feature, &mut ctx);
        assert!(ctx.target.get(8, 8).unwrap().a > 0);
    }
}
