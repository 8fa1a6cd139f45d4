//! Blend modes and the pixel compositor (§4.A).
//!
//! Every formula operates on **premultiplied** components in `[0, 1]`. The
//! Porter-Duff operators (`clear` .. `xor`, `plus`, `minus`) combine the two
//! premultiplied colors directly; the separable and non-separable blend
//! modes (`multiply` .. `value`) first compute a per-channel blend function
//! `B(backdrop, source)` over straight-alpha colors, then recombine with the
//! standard W3C Compositing-1 source-over formula. This avoids duplicating
//! premultiply/demultiply logic inside every blend arm.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Clear,
    Src,
    Dst,
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcAtop,
    DstAtop,
    Xor,
    Plus,
    Minus,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Contrast,
    Invert,
    InvertRgb,
    GrainMerge,
    GrainExtract,
    Hue,
    Saturation,
    Color,
    Value,
    LinearDodge,
    LinearBurn,
    Divide,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::SrcOver
    }
}

/// A straight-alpha RGB triple plus alpha, all in `[0, 1]`.
type Rgba = [f32; 4];

fn porter_duff_factors(mode: BlendMode) -> Option<(fn(f32, f32) -> f32, fn(f32, f32) -> f32)> {
    fn zero(_sa: f32, _da: f32) -> f32 {
        0.0
    }
    fn one(_sa: f32, _da: f32) -> f32 {
        1.0
    }
    fn da(_sa: f32, da: f32) -> f32 {
        da
    }
    fn sa(sa: f32, _da: f32) -> f32 {
        sa
    }
    fn one_minus_da(_sa: f32, da: f32) -> f32 {
        1.0 - da
    }
    fn one_minus_sa(sa: f32, _da: f32) -> f32 {
        1.0 - sa
    }
    match mode {
        BlendMode::Clear => Some((zero, zero)),
        BlendMode::Src => Some((one, zero)),
        BlendMode::Dst => Some((zero, one)),
        BlendMode::SrcOver => Some((one, one_minus_sa)),
        BlendMode::DstOver => Some((one_minus_da, one)),
        BlendMode::SrcIn => Some((da, zero)),
        BlendMode::DstIn => Some((zero, sa)),
        BlendMode::SrcOut => Some((one_minus_da, zero)),
        BlendMode::DstOut => Some((zero, one_minus_sa)),
        BlendMode::SrcAtop => Some((da, one_minus_sa)),
        BlendMode::DstAtop => Some((one_minus_da, sa)),
        BlendMode::Xor => Some((one_minus_da, one_minus_sa)),
        _ => None,
    }
}

/// Per-channel blend function `B(backdrop, source)`, both straight-alpha
/// `[0, 1]` scalars, used by the separable and HSL-family modes.
fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Overlay => blend_channel(BlendMode::HardLight, cs, cb),
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
        BlendMode::ColorDodge => {
            if cb <= 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if cb >= 1.0 {
                1.0
            } else if cs <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cb) / cs).min(1.0)
            }
        }
        BlendMode::HardLight => {
            if cs <= 0.5 {
                cb * (2.0 * cs)
            } else {
                blend_channel(BlendMode::Screen, cb, 2.0 * cs - 1.0)
            }
        }
        BlendMode::SoftLight => {
            fn d(x: f32) -> f32 {
                if x <= 0.25 {
                    ((16.0 * x - 12.0) * x + 4.0) * x
                } else {
                    x.sqrt()
                }
            }
            if cs <= 0.5 {
                cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
            } else {
                cb + (2.0 * cs - 1.0) * (d(cb) - cb)
            }
        }
        BlendMode::Difference => (cb - cs).abs(),
        BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
        BlendMode::LinearDodge => (cb + cs).min(1.0),
        BlendMode::LinearBurn => (cb + cs - 1.0).max(0.0),
        BlendMode::Divide => {
            if cs <= 0.0 {
                if cb > 0.0 {
                    1.0
                } else {
                    0.0
                }
            } else {
                (cb / cs).min(1.0)
            }
        }
        // AGG comp_op-derived extras (§9 open question: these have no
        // normative W3C definition; the formulas below match the classic
        // AGG/Photoshop "grain" and "contrast" pixel operations).
        BlendMode::GrainMerge => (cb + cs - 0.5).clamp(0.0, 1.0),
        BlendMode::GrainExtract => (cb - cs + 0.5).clamp(0.0, 1.0),
        BlendMode::Invert => 1.0 - cb,
        BlendMode::InvertRgb => 1.0 - cs,
        BlendMode::Contrast => ((cb - 0.5) * (1.0 + 2.0 * (cs - 0.5)) + 0.5).clamp(0.0, 1.0),
        _ => cs,
    }
}

fn luminosity(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(mut c: [f32; 3]) -> [f32; 3] {
    let l = luminosity(c);
    let n = c.iter().cloned().fold(f32::INFINITY, f32::min);
    let x = c.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if n < 0.0 && l != n {
        for v in c.iter_mut() {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && x != l {
        for v in c.iter_mut() {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    c
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - luminosity(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn saturation(c: [f32; 3]) -> f32 {
    let n = c.iter().cloned().fold(f32::INFINITY, f32::min);
    let x = c.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    x - n
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].partial_cmp(&c[b]).unwrap());
    let (lo, mid, hi) = (idx[0], idx[1], idx[2]);
    let mut out = [0.0f32; 3];
    if c[hi] > c[lo] {
        out[mid] = (c[mid] - c[lo]) * s / (c[hi] - c[lo]);
        out[hi] = s;
    }
    out[lo] = 0.0;
    out
}

fn non_separable_blend(mode: BlendMode, cb: [f32; 3], cs: [f32; 3]) -> [f32; 3] {
    match mode {
        BlendMode::Hue => set_lum(set_sat(cs, saturation(cb)), luminosity(cb)),
        BlendMode::Saturation => set_lum(set_sat(cb, saturation(cs)), luminosity(cb)),
        BlendMode::Color => set_lum(cs, luminosity(cb)),
        BlendMode::Value => set_lum(cb, luminosity(cs)),
        _ => cs,
    }
}

fn is_non_separable(mode: BlendMode) -> bool {
    matches!(
        mode,
        BlendMode::Hue | BlendMode::Saturation | BlendMode::Color | BlendMode::Value
    )
}

/// Blends straight-alpha `src` over straight-alpha `dst`, returning a
/// **premultiplied** result, for any mode not covered by the Porter-Duff
/// fast path.
fn blend_straight_over(mode: BlendMode, src: Rgba, dst: Rgba) -> Rgba {
    let (sa, da) = (src[3], dst[3]);
    let cb = [dst[0], dst[1], dst[2]];
    let cs = [src[0], src[1], src[2]];
    let blended = if is_non_separable(mode) {
        non_separable_blend(mode, cb, cs)
    } else {
        [
            blend_channel(mode, cb[0], cs[0]),
            blend_channel(mode, cb[1], cs[1]),
            blend_channel(mode, cb[2], cs[2]),
        ]
    };
    let mut out_straight_src = [0.0f32; 3];
    for i in 0..3 {
        out_straight_src[i] = (1.0 - da) * cs[i] + da * blended[i];
    }
    let dst_premul = [cb[0] * da, cb[1] * da, cb[2] * da];
    let mut out = [0.0f32; 4];
    for i in 0..3 {
        out[i] = sa * out_straight_src[i] + (1.0 - sa) * dst_premul[i];
    }
    out[3] = sa + da * (1.0 - sa);
    out
}

/// Blends two **premultiplied** colors under `mode`, returning a
/// premultiplied result.
pub fn blend_premultiplied(mode: BlendMode, src: Rgba, dst: Rgba) -> Rgba {
    if let Some((fa, fb)) = porter_duff_factors(mode) {
        let (sa, da) = (src[3], dst[3]);
        let fa = fa(sa, da);
        let fb = fb(sa, da);
        let mut out = [0.0f32; 4];
        for i in 0..4 {
            out[i] = (src[i] * fa + dst[i] * fb).clamp(0.0, 1.0);
        }
        return out;
    }
    match mode {
        BlendMode::Plus => {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = (src[i] + dst[i]).clamp(0.0, 1.0);
            }
            out
        }
        BlendMode::Minus => {
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                out[i] = (dst[i] - src[i]).clamp(0.0, 1.0);
            }
            out[3] = (src[3] + dst[3] * (1.0 - src[3])).clamp(0.0, 1.0);
            out
        }
        _ => {
            let src_straight = unpremultiply(src);
            let dst_straight = unpremultiply(dst);
            blend_straight_over(mode, src_straight, dst_straight)
        }
    }
}

fn unpremultiply(c: Rgba) -> Rgba {
    if c[3] <= 0.0 {
        return [0.0, 0.0, 0.0, 0.0];
    }
    [
        (c[0] / c[3]).min(1.0),
        (c[1] / c[3]).min(1.0),
        (c[2] / c[3]).min(1.0),
        c[3],
    ]
}

use crate::buffer::PixelBuffer;
use crate::format::PixelFormat;

/// Blends `src` onto `dst` at integer offset `(dx, dy)`, clipped to `dst`'s
/// rectangle. Both buffers must already be premultiplied.
pub fn composite<P: PixelFormat>(
    dst: &mut PixelBuffer<P>,
    src: &PixelBuffer<P>,
    mode: BlendMode,
    opacity: f64,
    dx: i64,
    dy: i64,
) {
    assert!(
        dst.is_premultiplied() && src.is_premultiplied(),
        "composite: both buffers must be premultiplied (invariant violation)"
    );
    let opacity = opacity.clamp(0.0, 1.0) as f32;
    for sy in 0..src.height() {
        let ty = dy + sy as i64;
        if ty < 0 || ty >= dst.height() as i64 {
            continue;
        }
        for sx in 0..src.width() {
            let tx = dx + sx as i64;
            if tx < 0 || tx >= dst.width() as i64 {
                continue;
            }
            let (tx, ty) = (tx as u32, ty as u32);
            let mut sp = src.get(sx, sy).unwrap().to_components_f32();
            sp[3] *= opacity;
            sp[0] *= opacity;
            sp[1] *= opacity;
            sp[2] *= opacity;
            let dp = dst.get(tx, ty).unwrap().to_components_f32();
            let out = blend_premultiplied(mode, sp, dp);
            dst.set(tx, ty, P::from_components_f32(out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Rgba8;

    fn approx(a: Rgba, b: Rgba) {
        for i in 0..4 {
            assert!((a[i] - b[i]).abs() < 0.01, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn src_over_with_empty_transparent_source_is_identity() {
        let x: Rgba = [0.2, 0.4, 0.6, 0.8];
        let empty = [0.0, 0.0, 0.0, 0.0];
        approx(blend_premultiplied(BlendMode::SrcOver, empty, x), x);
    }

    #[test]
    fn src_over_onto_empty_transparent_dest_is_source() {
        let x: Rgba = [0.2, 0.4, 0.6, 0.8];
        let empty = [0.0, 0.0, 0.0, 0.0];
        approx(blend_premultiplied(BlendMode::SrcOver, x, empty), x);
    }

    #[test]
    fn opaque_red_over_white_is_opaque_red() {
        let red = Rgba8 { r: 255, g: 0, b: 0, a: 255 }.to_components_f32();
        let white = Rgba8 { r: 255, g: 255, b: 255, a: 255 }.to_components_f32();
        let out = blend_premultiplied(BlendMode::SrcOver, red, white);
        let out_px = Rgba8::from_components_f32(out);
        assert_eq!(out_px, Rgba8 { r: 255, g: 0, b: 0, a: 255 });
    }

    #[test]
    fn multiply_black_over_anything_is_black() {
        let black = [0.0, 0.0, 0.0, 1.0];
        let other = [0.7, 0.3, 0.9, 1.0];
        let out = blend_premultiplied(BlendMode::Multiply, black, other);
        approx(out, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn composite_respects_clipped_offset() {
        let mut dst: PixelBuffer<Rgba8> = PixelBuffer::new(4, 4);
        dst.set_premultiplied_flag(false);
        dst.fill(crate::color::Color::rgb(0, 0, 0));
        dst.premultiply();
        let mut src: PixelBuffer<Rgba8> = PixelBuffer::new(4, 4);
        src.set_premultiplied_flag(false);
        src.fill(crate::color::Color::rgb(255, 255, 255));
        src.premultiply();
        composite(&mut dst, &src, BlendMode::SrcOver, 1.0, 2, 2);
        // out-of-bounds rows/cols are untouched
        assert_eq!(dst.get(0, 0), Some(Rgba8 { r: 0, g: 0, b: 0, a: 255 }));
        // in-bounds overlap is overwritten by opaque white
        assert_eq!(dst.get(3, 3), Some(Rgba8 { r: 255, g: 255, b: 255, a: 255 }));
    }
}
