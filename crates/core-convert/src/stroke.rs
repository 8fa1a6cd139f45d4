//! Stroke expansion (§4.C.8): widens a flattened polyline into a fillable
//! polygon according to cap/join/width/miter-limit, grounded on the
//! `line_cap_e`/`line_join_e` vocabulary of mapnik's `stroke` style
//! descriptor. Output is consumed by the non-zero-rule rasterizer, same as
//! any other polygon.

use core_geom::vertex::Command;

use crate::subpath::{split_subpaths, Subpath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Square,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    MiterRevert,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { width: 1.0, cap: LineCap::Butt, join: LineJoin::Miter, miter_limit: 4.0 }
    }
}

fn sub(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 - b.0, a.1 - b.1)
}

fn normalize(v: (f64, f64)) -> (f64, f64) {
    let len = (v.0 * v.0 + v.1 * v.1).sqrt();
    if len < f64::EPSILON {
        (0.0, 0.0)
    } else {
        (v.0 / len, v.1 / len)
    }
}

fn left_normal(dir: (f64, f64)) -> (f64, f64) {
    (-dir.1, dir.0)
}

fn arc_points(center: (f64, f64), from: (f64, f64), to: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    let a0 = (from.1 - center.1).atan2(from.0 - center.0);
    let mut a1 = (to.1 - center.1).atan2(to.0 - center.0);
    // Walk the shorter way around, matching AGG's round-join/cap arc sweep.
    let mut delta = a1 - a0;
    while delta > std::f64::consts::PI {
        delta -= std::f64::consts::TAU;
    }
    while delta < -std::f64::consts::PI {
        delta += std::f64::consts::TAU;
    }
    a1 = a0 + delta;
    let steps = ((delta.abs() / 0.3).ceil() as usize).max(1);
    (1..steps)
        .map(|i| {
            let t = a0 + delta * (i as f64 / steps as f64);
            (center.0 + radius * t.cos(), center.1 + radius * t.sin())
        })
        .collect()
}

/// One side's offset polyline (left or right of travel direction) for an
/// open or closed chain, with joins resolved at interior vertices.
fn build_side(points: &[(f64, f64)], closed: bool, half_width: f64, style: &StrokeStyle, sign: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    let segment_count = if closed { n } else { n - 1 };
    let dirs: Vec<(f64, f64)> = (0..segment_count)
        .map(|i| normalize(sub(points[(i + 1) % n], points[i])))
        .collect();

    let mut out = Vec::new();
    let vertex_range = if closed { 0..n } else { 0..n };
    for i in vertex_range {
        let prev_dir = if i == 0 {
            if closed { dirs[segment_count - 1] } else { dirs[0] }
        } else {
            dirs[(i - 1).min(segment_count - 1)]
        };
        let next_dir = if i < segment_count { dirs[i] } else { dirs[segment_count - 1] };

        let n_prev = (left_normal(prev_dir).0 * sign, left_normal(prev_dir).1 * sign);
        let n_next = (left_normal(next_dir).0 * sign, left_normal(next_dir).1 * sign);

        let is_endpoint = !closed && (i == 0 || i == n - 1);
        if is_endpoint || (n_prev.0 - n_next.0).abs() < 1e-9 && (n_prev.1 - n_next.1).abs() < 1e-9 {
            let normal = if i == 0 { n_next } else { n_prev };
            out.push((points[i].0 + normal.0 * half_width, points[i].1 + normal.1 * half_width));
            continue;
        }

        match style.join {
            LineJoin::Round => {
                let p_in = (points[i].0 + n_prev.0 * half_width, points[i].1 + n_prev.1 * half_width);
                let p_out = (points[i].0 + n_next.0 * half_width, points[i].1 + n_next.1 * half_width);
                out.push(p_in);
                out.extend(arc_points(points[i], p_in, p_out, half_width));
                out.push(p_out);
            }
            LineJoin::Bevel => {
                out.push((points[i].0 + n_prev.0 * half_width, points[i].1 + n_prev.1 * half_width));
                out.push((points[i].0 + n_next.0 * half_width, points[i].1 + n_next.1 * half_width));
            }
            LineJoin::Miter | LineJoin::MiterRevert => {
                let bis = normalize((n_prev.0 + n_next.0, n_prev.1 + n_next.1));
                let cos_half = (bis.0 * n_prev.0 + bis.1 * n_prev.1).clamp(-1.0, 1.0);
                let miter_len = if cos_half > 1e-6 { half_width / cos_half } else { half_width * style.miter_limit + 1.0 };
                if miter_len / half_width <= style.miter_limit {
                    out.push((points[i].0 + bis.0 * miter_len, points[i].1 + bis.1 * miter_len));
                } else {
                    out.push((points[i].0 + n_prev.0 * half_width, points[i].1 + n_prev.1 * half_width));
                    out.push((points[i].0 + n_next.0 * half_width, points[i].1 + n_next.1 * half_width));
                }
            }
        }
    }
    out
}

fn cap_points(center: (f64, f64), dir: (f64, f64), half_width: f64, cap: LineCap, outward: f64) -> Vec<(f64, f64)> {
    let normal = left_normal(dir);
    let p_left = (center.0 + normal.0 * half_width, center.1 + normal.1 * half_width);
    let p_right = (center.0 - normal.0 * half_width, center.1 - normal.1 * half_width);
    match cap {
        LineCap::Butt => vec![],
        LineCap::Square => {
            let ext = (dir.0 * half_width * outward, dir.1 * half_width * outward);
            vec![(p_left.0 + ext.0, p_left.1 + ext.1), (p_right.0 + ext.0, p_right.1 + ext.1)]
        }
        LineCap::Round => arc_points(center, p_left, p_right, half_width),
    }
}

fn stroke_open(points: &[(f64, f64)], style: &StrokeStyle) -> Option<Subpath> {
    if points.len() < 2 {
        return None;
    }
    let half_width = (style.width * 0.5).max(1e-6);
    let left = build_side(points, false, half_width, style, 1.0);
    let mut right = build_side(points, false, half_width, style, -1.0);
    right.reverse();

    let start_dir = normalize(sub(points[1], points[0]));
    let end_dir = normalize(sub(points[points.len() - 1], points[points.len() - 2]));

    let mut ring = Vec::new();
    ring.extend(left);
    ring.extend(cap_points(points[points.len() - 1], end_dir, half_width, style.cap, 1.0));
    ring.extend(right);
    ring.extend(cap_points(points[0], start_dir, half_width, style.cap, -1.0));
    Some(Subpath { points: ring, closed: true })
}

fn stroke_closed(points: &[(f64, f64)], style: &StrokeStyle) -> Vec<Subpath> {
    if points.len() < 3 {
        return vec![];
    }
    let half_width = (style.width * 0.5).max(1e-6);
    let outer = build_side(points, true, half_width, style, 1.0);
    let mut inner = build_side(points, true, half_width, style, -1.0);
    inner.reverse();
    vec![
        Subpath { points: outer, closed: true },
        Subpath { points: inner, closed: true },
    ]
}

/// Expands every subpath in `commands` into a stroke-outline polygon,
/// joined as one command stream (fill with the non-zero rule, §4.H).
pub fn stroke(commands: &[Command], style: &StrokeStyle) -> Vec<Command> {
    let mut subs = Vec::new();
    for sub in split_subpaths(commands) {
        if sub.closed {
            subs.extend(stroke_closed(&sub.points, style));
        } else if let Some(ring) = stroke_open(&sub.points, style) {
            subs.push(ring);
        }
    }
    crate::subpath::join_subpaths(&subs)
}
