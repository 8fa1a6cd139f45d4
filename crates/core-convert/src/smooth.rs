//! Polygon/line smoothing (§4.C.5): two cubic-Bezier control-point
//! generators over the same vertex window, grounded on AGG's
//! `vcgen_smooth_poly1` state machine and mapnik's adaptive variant.
//!
//! Rather than reimplement the state machine's pull-based `vertex()`
//! protocol, the window (`prev, curr, next, next2`) is walked directly and
//! each segment is emitted as a single `Curve4`/`Curve3` command — the two
//! representations carry the same information, since AGG's three
//! curve-tagged vertices per segment are exactly this crate's one bundled
//! `Command::Curve4 { cx1, cy1, cx2, cy2, x, y }`.

use core_geom::vertex::Command;

use crate::subpath::{split_subpaths, Subpath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothAlgorithm {
    Basic,
    Adaptive,
}

#[derive(Debug, Clone, Copy)]
struct VertexDist {
    x: f64,
    y: f64,
    dist: f64,
}

fn compute_dists(points: &[(f64, f64)], closed: bool) -> Vec<VertexDist> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (x, y) = points[i];
            let dist = if i + 1 < n {
                dist_between(points[i], points[i + 1])
            } else if closed {
                dist_between(points[i], points[0])
            } else {
                0.0
            };
            VertexDist { x, y, dist }
        })
        .collect()
}

fn dist_between(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

fn calc_basic(v0: VertexDist, v1: VertexDist, v2: VertexDist, v3: VertexDist, sv: f64) -> ((f64, f64), (f64, f64)) {
    let k1 = safe_ratio(v0.dist, v0.dist + v1.dist);
    let k2 = safe_ratio(v1.dist, v1.dist + v2.dist);

    let xm1 = v0.x + (v2.x - v0.x) * k1;
    let ym1 = v0.y + (v2.y - v0.y) * k1;
    let xm2 = v1.x + (v3.x - v1.x) * k2;
    let ym2 = v1.y + (v3.y - v1.y) * k2;

    (
        (v1.x + sv * (v2.x - xm1), v1.y + sv * (v2.y - ym1)),
        (v2.x + sv * (v1.x - xm2), v2.y + sv * (v1.y - ym2)),
    )
}

fn calc_adaptive(v0: VertexDist, v1: VertexDist, v2: VertexDist, v3: VertexDist, sv: f64) -> ((f64, f64), (f64, f64)) {
    let k1 = safe_ratio(v0.dist, v0.dist + v1.dist);
    let k2 = safe_ratio(v1.dist, v1.dist + v2.dist);

    let xm1 = v0.x + (v2.x - v0.x) * k1;
    let ym1 = v0.y + (v2.y - v0.y) * k1;
    let xm2 = v1.x + (v3.x - v1.x) * k2;
    let ym2 = v1.y + (v3.y - v1.y) * k2;

    let mut s1 = 0.0;
    let mut s2 = 0.0;
    let half_pi = std::f64::consts::FRAC_PI_2;

    if v1.dist > 0.0 {
        if v0.dist > 0.0 {
            let dot1 = (v0.x - v1.x) * (v2.x - v1.x) + (v0.y - v1.y) * (v2.y - v1.y);
            let cos1 = (dot1 / (v0.dist * v1.dist)).clamp(-1.0, 1.0);
            let a1 = cos1.acos();
            if a1 >= half_pi {
                s1 = (a1 - half_pi) / half_pi;
            }
        }
        if v2.dist > 0.0 {
            let dot2 = (v1.x - v2.x) * (v3.x - v2.x) + (v1.y - v2.y) * (v3.y - v2.y);
            let cos2 = (dot2 / (v1.dist * v2.dist)).clamp(-1.0, 1.0);
            let a2 = cos2.acos();
            if a2 >= half_pi {
                s2 = (a2 - half_pi) / half_pi;
            }
        }
    }

    (
        (v1.x + s1 * sv * (v2.x - xm1), v1.y + s1 * sv * (v2.y - ym1)),
        (v2.x + s2 * sv * (v1.x - xm2), v2.y + s2 * sv * (v1.y - ym2)),
    )
}

fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > f64::EPSILON {
        num / den
    } else {
        0.5
    }
}

/// Smooths a single subpath's point sequence. `smooth_value` is the
/// symbolizer's `smooth` property in `[0, 1]`; internally halved to match
/// AGG's `smooth_value(v) { m = v * 0.5; }` convention.
fn smooth_points(points: &[(f64, f64)], closed: bool, algo: SmoothAlgorithm, smooth_value: f64) -> Vec<Command> {
    let n = points.len();
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    if n < 3 {
        out.push(Command::MoveTo { x: points[0].0, y: points[0].1 });
        for &(x, y) in &points[1..] {
            out.push(Command::LineTo { x, y });
        }
        if closed {
            out.push(Command::Close);
        }
        return out;
    }

    let dists = compute_dists(points, closed);
    let sv = smooth_value * 0.5;
    let calc = match algo {
        SmoothAlgorithm::Basic => calc_basic,
        SmoothAlgorithm::Adaptive => calc_adaptive,
    };

    let wrap = |i: i64| -> usize {
        if closed {
            (((i % n as i64) + n as i64) % n as i64) as usize
        } else {
            i.clamp(0, n as i64 - 1) as usize
        }
    };

    out.push(Command::MoveTo { x: points[0].0, y: points[0].1 });

    let segment_count = if closed { n } else { n - 1 };
    for k in 0..segment_count {
        let v0 = dists[wrap(k as i64 - 1)];
        let v1 = dists[wrap(k as i64)];
        let v2 = dists[wrap(k as i64 + 1)];
        let v3 = dists[wrap(k as i64 + 2)];
        let (ctrl1, ctrl2) = calc(v0, v1, v2, v3, sv);
        let end_idx = wrap(k as i64 + 1);
        let (ex, ey) = (points[end_idx].0, points[end_idx].1);

        if !closed && k == 0 && segment_count > 1 {
            out.push(Command::Curve3 { cx: ctrl2.0, cy: ctrl2.1, x: ex, y: ey });
        } else if !closed && k == segment_count - 1 && segment_count > 1 {
            out.push(Command::Curve3 { cx: ctrl1.0, cy: ctrl1.1, x: ex, y: ey });
        } else {
            out.push(Command::Curve4 {
                cx1: ctrl1.0,
                cy1: ctrl1.1,
                cx2: ctrl2.0,
                cy2: ctrl2.1,
                x: ex,
                y: ey,
            });
        }
    }

    if closed {
        out.push(Command::Close);
    }
    out
}

/// Smooths every subpath in `commands`. Only meaningful for `smooth_value >
/// 0.0`; a caller at `0.0` should skip this converter entirely (§4.H marks
/// it optional).
pub fn smooth(commands: &[Command], algo: SmoothAlgorithm, smooth_value: f64) -> Vec<Command> {
    let mut out = Vec::new();
    for sub in split_subpaths(commands) {
        out.extend(smooth_points(&sub.points, sub.closed, algo, smooth_value));
    }
    out.push(Command::End);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Subpath {
        Subpath {
            points: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            closed: true,
        }
    }

    #[test]
    fn closed_ring_smoothing_emits_one_curve4_per_edge_and_closes() {
        let sq = square();
        let out = smooth_points(&sq.points, sq.closed, SmoothAlgorithm::Basic, 0.5);
        let curve4_count = out.iter().filter(|c| matches!(c, Command::Curve4 { .. })).count();
        assert_eq!(curve4_count, 4);
        assert_eq!(out.last(), Some(&Command::Close));
    }

    #[test]
    fn open_line_uses_curve3_at_both_ends_and_curve4_in_the_middle() {
        let points = vec![(0.0, 0.0), (5.0, 5.0), (10.0, 0.0), (15.0, 5.0)];
        let out = smooth_points(&points, false, SmoothAlgorithm::Basic, 0.5);
        let curve3_count = out.iter().filter(|c| matches!(c, Command::Curve3 { .. })).count();
        let curve4_count = out.iter().filter(|c| matches!(c, Command::Curve4 { .. })).count();
        assert_eq!(curve3_count, 2);
        assert_eq!(curve4_count, 1);
    }

    #[test]
    fn zero_smooth_value_keeps_control_points_near_the_vertex_chord() {
        let points = vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        let out = smooth_points(&points, false, SmoothAlgorithm::Basic, 0.0);
        for c in &out {
            if let Command::Curve3 { cx, cy, .. } = c {
                assert!(cy.abs() < 1e-9);
                assert!(*cx >= -1e-9 && *cx <= 20.0 + 1e-9);
            }
        }
    }

    #[test]
    fn adaptive_smoothing_leaves_colinear_vertices_unflexed() {
        let points = vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)];
        let out = smooth_points(&points, false, SmoothAlgorithm::Adaptive, 1.0);
        for c in &out {
            if let Command::Curve4 { cy1, cy2, .. } = c {
                assert!(cy1.abs() < 1e-9 && cy2.abs() < 1e-9);
            }
        }
    }
}
