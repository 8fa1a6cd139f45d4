//! Bitmap marker compositing (§4.F step 5): an already-decoded raster
//! marker (PNG icon) is warped by the placement's scale/rotation affine and
//! composited the same way a raster symbolizer tile is (core-resample +
//! core-pixel).

use core_pixel::blend::blend_premultiplied;
use core_pixel::{BlendMode, PixelBuffer, PixelFormat, Rgba8};
use core_resample::{warp, Filter};
use glam::{Affine2, Vec2};

use crate::vector::Placement;

/// A decoded bitmap marker: pixels plus the anchor (in source pixel space)
/// that lands on the placement point, defaulting to the image's center.
#[derive(Debug, Clone)]
pub struct BitmapMarker {
    pub image: PixelBuffer<Rgba8>,
    pub anchor: (f64, f64),
}

impl BitmapMarker {
    pub fn new(image: PixelBuffer<Rgba8>) -> Self {
        let anchor = (image.width() as f64 / 2.0, image.height() as f64 / 2.0);
        Self { image, anchor }
    }
}

/// Renders `marker` onto `target` at `placement`, scaled by
/// `scale_factor` and rotated by `placement.rotation`, composited with
/// `comp_op` at `opacity` (§4.F step 5).
pub fn render_bitmap_marker(
    marker: &BitmapMarker,
    placement: &Placement,
    scale_factor: f64,
    opacity: f64,
    comp_op: BlendMode,
    target: &mut PixelBuffer<Rgba8>,
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || marker.image.width() == 0 || marker.image.height() == 0 {
        return;
    }

    let anchor = placement.anchor_override.unwrap_or(marker.anchor);
    let to_origin = Affine2::from_translation(Vec2::new(-anchor.0 as f32, -anchor.1 as f32));
    let scaled = Affine2::from_scale(Vec2::splat(scale_factor as f32));
    let place = Affine2::from_angle_translation(
        placement.rotation as f32,
        Vec2::new(placement.position.0 as f32, placement.position.1 as f32),
    );
    let src_to_dst = place * scaled * to_origin;

    let half_extent = ((marker.image.width().max(marker.image.height())) as f64 * scale_factor * 1.5).ceil() as i64;
    let tile_size = (half_extent.max(1) * 2) as u32;
    let mut tile: PixelBuffer<Rgba8> = PixelBuffer::new(tile_size, tile_size);
    let tile_offset = Affine2::from_translation(Vec2::new(half_extent as f32, half_extent as f32));
    let tile_transform = tile_offset * src_to_dst;
    warp(&mut tile, &marker.image, tile_transform, Filter::Bilinear, None);

    let dst_x0 = placement.position.0.round() as i64 - half_extent;
    let dst_y0 = placement.position.1.round() as i64 - half_extent;

    for ty in 0..tile.height() {
        let dst_y = dst_y0 + ty as i64;
        if dst_y < 0 || dst_y as u32 >= target.height() {
            continue;
        }
        for tx in 0..tile.width() {
            let dst_x = dst_x0 + tx as i64;
            if dst_x < 0 || dst_x as u32 >= target.width() {
                continue;
            }
            let mut sp = tile.get(tx, ty).expect("tile bounds checked").to_components_f32();
            sp[3] *= opacity as f32;
            sp[0] *= opacity as f32;
            sp[1] *= opacity as f32;
            sp[2] *= opacity as f32;
            if sp[3] <= 0.0 {
                continue;
            }
            let dp = target.get(dst_x as u32, dst_y as u32).expect("target bounds checked").to_components_f32();
            let out = blend_premultiplied(comp_op, sp, dp);
            target.set(dst_x as u32, dst_y as u32, Rgba8::from_components_f32(out));
        }
    }
}
