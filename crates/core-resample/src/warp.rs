//! Affine-mapped reconstruction (§4.E): `warp` samples a source buffer into
//! a destination buffer through the inverse of a source-to-destination
//! affine, and `warp_mesh` approximates a non-affine (projected)
//! reprojection by fitting a local affine per `mesh_size` destination cell.

use glam::{Affine2, Mat2, Vec2};

use core_pixel::{PixelBuffer, PixelFormat};

use crate::filter::{Filter, FilterLut};

fn clamp_sample<P: PixelFormat>(src: &PixelBuffer<P>, x: i64, y: i64) -> P {
    let cx = x.clamp(0, src.width() as i64 - 1) as u32;
    let cy = y.clamp(0, src.height() as i64 - 1) as u32;
    src.get(cx, cy).expect("clamp_sample: clamped coordinates are always in bounds")
}

/// Samples `src` at source-space coordinate `(x, y)` (pixel centers at
/// integer + 0.5) through `filter`. Out-of-source coordinates clamp to the
/// nearest in-source pixel (§4.E edge policy). `nodata`, when present,
/// excludes matching samples from the weighted average; a destination pixel
/// whose surviving weight is zero resolves to `nodata` itself.
pub fn sample_filtered<P: PixelFormat + PartialEq>(
    src: &PixelBuffer<P>,
    x: f64,
    y: f64,
    filter: Filter,
    lut: &FilterLut,
    nodata: Option<P>,
) -> P {
    if filter == Filter::Near {
        let sx = x.floor() as i64;
        let sy = y.floor() as i64;
        return clamp_sample(src, sx, sy);
    }

    let radius = lut.radius();
    let x0 = (x - radius).floor() as i64;
    let x1 = (x + radius).ceil() as i64;
    let y0 = (y - radius).floor() as i64;
    let y1 = (y + radius).ceil() as i64;

    let mut acc = [0.0f64; 4];
    let mut weight_sum = 0.0f64;
    for sy in y0..=y1 {
        let wy = lut.sample(sy as f64 + 0.5 - y);
        if wy == 0.0 {
            continue;
        }
        for sx in x0..=x1 {
            let wx = lut.sample(sx as f64 + 0.5 - x);
            let w = wx * wy;
            if w == 0.0 {
                continue;
            }
            let p = clamp_sample(src, sx, sy);
            if let Some(nd) = nodata {
                if p == nd {
                    continue;
                }
            }
            let c = p.to_components_f32();
            for k in 0..4 {
                acc[k] += c[k] as f64 * w;
            }
            weight_sum += w;
        }
    }

    if weight_sum <= 0.0 {
        return nodata.unwrap_or_else(|| clamp_sample(src, x.floor() as i64, y.floor() as i64));
    }
    let mut out = [0.0f32; 4];
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = (acc[k] / weight_sum) as f32;
    }
    P::from_components_f32(out)
}

/// Fills `dst` by mapping each destination pixel through the inverse of
/// `affine_src_to_dst` and reconstructing from `src` with `filter` (§4.E).
pub fn warp<P: PixelFormat + PartialEq>(
    dst: &mut PixelBuffer<P>,
    src: &PixelBuffer<P>,
    affine_src_to_dst: Affine2,
    filter: Filter,
    nodata: Option<P>,
) {
    let inverse = affine_src_to_dst.inverse();
    let lut = FilterLut::new(filter);
    for j in 0..dst.height() {
        for i in 0..dst.width() {
            let dst_pt = Vec2::new(i as f32 + 0.5, j as f32 + 0.5);
            let src_pt = inverse.transform_point2(dst_pt);
            let pixel = sample_filtered(src, src_pt.x as f64, src_pt.y as f64, filter, &lut, nodata);
            dst.set(i, j, pixel);
        }
    }
}

/// Default mesh cell size in destination pixels (§4.E "default cell size 16
/// px").
pub const DEFAULT_MESH_SIZE: u32 = 16;

/// Approximates a non-affine `inverse_map` (destination -> source) with a
/// per-cell affine fit from three corner samples, subdividing the
/// destination into `mesh_size`-pixel cells (§4.E "Mesh warp").
pub fn warp_mesh<P, F>(
    dst: &mut PixelBuffer<P>,
    src: &PixelBuffer<P>,
    inverse_map: F,
    filter: Filter,
    nodata: Option<P>,
    mesh_size: u32,
) where
    P: PixelFormat + PartialEq,
    F: Fn(f64, f64) -> (f64, f64),
{
    let mesh_size = mesh_size.max(1);
    let lut = FilterLut::new(filter);
    let (width, height) = (dst.width(), dst.height());

    let mut cy = 0;
    while cy < height {
        let ch = mesh_size.min(height - cy);
        let mut cx = 0;
        while cx < width {
            let cw = mesh_size.min(width - cx);
            let local = fit_cell_affine(&inverse_map, cx, cy, cw, ch);
            for dy in 0..ch {
                for dx in 0..cw {
                    let px = cx + dx;
                    let py = cy + dy;
                    let dst_pt = Vec2::new(dx as f32 + 0.5, dy as f32 + 0.5);
                    let src_pt = local.transform_point2(dst_pt);
                    let pixel = sample_filtered(src, src_pt.x as f64, src_pt.y as f64, filter, &lut, nodata);
                    dst.set(px, py, pixel);
                }
            }
            cx += cw;
        }
        cy += ch;
    }
}

/// Builds the affine that best matches `inverse_map` at the cell's three
/// non-collinear corners (top-left, top-right, bottom-left), exact on those
/// three points by construction.
fn fit_cell_affine<F: Fn(f64, f64) -> (f64, f64)>(inverse_map: &F, cx: u32, cy: u32, cw: u32, ch: u32) -> Affine2 {
    let (sx0, sy0) = inverse_map(cx as f64, cy as f64);
    let (sx1, sy1) = inverse_map((cx + cw) as f64, cy as f64);
    let (sx2, sy2) = inverse_map(cx as f64, (cy + ch) as f64);

    let dx = cw as f64;
    let dy = ch as f64;
    let col0 = Vec2::new(((sx1 - sx0) / dx) as f32, ((sy1 - sy0) / dx) as f32);
    let col1 = Vec2::new(((sx2 - sx0) / dy) as f32, ((sy2 - sy0) / dy) as f32);
    let translation = Vec2::new(sx0 as f32, sy0 as f32);
    Affine2::from_mat2_translation(Mat2::from_cols(col0, col1), translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_pixel::Rgba8;

    fn random_buffer(w: u32, h: u32, seed: &mut u64) -> PixelBuffer<Rgba8> {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h {
            for x in 0..w {
                *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                let byte = |shift: u32| ((*seed >> shift) & 0xFF) as u8;
                buf.set(x, y, Rgba8 { r: byte(0), g: byte(8), b: byte(16), a: 255 });
            }
        }
        buf
    }

    #[test]
    fn identity_warp_with_near_filter_is_a_memcpy() {
        let mut seed = 42u64;
        let src = random_buffer(64, 64, &mut seed);
        let mut dst: PixelBuffer<Rgba8> = PixelBuffer::new(64, 64);
        warp(&mut dst, &src, Affine2::IDENTITY, Filter::Near, None);
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(dst.get(x, y), src.get(x, y));
            }
        }
    }

    #[test]
    fn identity_warp_with_bilinear_matches_within_rounding() {
        let mut seed = 7u64;
        let src = random_buffer(32, 32, &mut seed);
        let mut dst: PixelBuffer<Rgba8> = PixelBuffer::new(32, 32);
        warp(&mut dst, &src, Affine2::IDENTITY, Filter::Bilinear, None);
        for y in 0..32 {
            for x in 0..32 {
                let s = src.get(x, y).unwrap();
                let d = dst.get(x, y).unwrap();
                assert!((s.r as i16 - d.r as i16).abs() <= 1);
                assert!((s.g as i16 - d.g as i16).abs() <= 1);
                assert!((s.b as i16 - d.b as i16).abs() <= 1);
            }
        }
    }

    #[test]
    fn out_of_source_samples_clamp_to_the_nearest_edge_pixel() {
        let mut src: PixelBuffer<Rgba8> = PixelBuffer::new(4, 4);
        src.fill(core_pixel::Color::rgb(10, 20, 30));
        let lut = FilterLut::new(Filter::Near);
        let p = sample_filtered(&src, -50.0, -50.0, Filter::Near, &lut, None);
        assert_eq!(p, Rgba8 { r: 10, g: 20, b: 30, a: 255 });
    }

    #[test]
    fn nodata_sample_excluded_leaves_neighbor_value() {
        let mut src: PixelBuffer<Rgba8> = PixelBuffer::new(2, 1);
        let nodata_px = Rgba8 { r: 0, g: 0, b: 0, a: 0 };
        src.set(0, 0, nodata_px);
        src.set(1, 0, Rgba8 { r: 100, g: 100, b: 100, a: 255 });
        let lut = FilterLut::new(Filter::Bilinear);
        let p = sample_filtered(&src, 1.0, 0.5, Filter::Bilinear, &lut, Some(nodata_px));
        assert_eq!(p, Rgba8 { r: 100, g: 100, b: 100, a: 255 });
    }

    #[test]
    fn all_nodata_support_writes_nodata() {
        let mut src: PixelBuffer<Rgba8> = PixelBuffer::new(2, 1);
        let nodata_px = Rgba8 { r: 0, g: 0, b: 0, a: 0 };
        src.set(0, 0, nodata_px);
        src.set(1, 0, nodata_px);
        let lut = FilterLut::new(Filter::Bilinear);
        let p = sample_filtered(&src, 1.0, 0.5, Filter::Bilinear, &lut, Some(nodata_px));
        assert_eq!(p, nodata_px);
    }

    #[test]
    fn mesh_warp_of_an_affine_map_matches_direct_warp() {
        let mut seed = 99u64;
        let src = random_buffer(48, 48, &mut seed);
        let affine = Affine2::from_scale_angle_translation(Vec2::new(1.0, 1.0), 0.0, Vec2::new(2.0, 3.0));
        let inverse = affine.inverse();

        let mut dst_direct: PixelBuffer<Rgba8> = PixelBuffer::new(48, 48);
        warp(&mut dst_direct, &src, affine, Filter::Near, None);

        let mut dst_mesh: PixelBuffer<Rgba8> = PixelBuffer::new(48, 48);
        warp_mesh(
            &mut dst_mesh,
            &src,
            |x, y| {
                let p = inverse.transform_point2(Vec2::new(x as f32, y as f32));
                (p.x as f64, p.y as f64)
            },
            Filter::Near,
            None,
            16,
        );

        for y in 0..48 {
            for x in 0..48 {
                assert_eq!(dst_direct.get(x, y), dst_mesh.get(x, y));
            }
        }
    }
}
