//! Curve flattener: reduces `Curve3`/`Curve4` commands emitted by the
//! smoother into `LineTo` chains, by recursive de Casteljau subdivision
//! stopping once the control polygon deviates from its chord by less than
//! `tolerance_px` (AGG's adaptive curve-subdivision criterion, §4.C.5).

use core_geom::vertex::Command;

const MAX_RECURSION: u32 = 24;

fn flatten_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return ((p.0 - a.0).powi(2) + (p.1 - a.1).powi(2)).sqrt();
    }
    ((dy * p.0 - dx * p.1 + b.0 * a.1 - b.1 * a.0).abs()) / len_sq.sqrt()
}

fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

fn quad_subdivide(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    tolerance: f64,
    depth: u32,
    out: &mut Vec<(f64, f64)>,
) {
    if depth >= MAX_RECURSION || flatten_distance(p1, p0, p2) <= tolerance {
        out.push(p2);
        return;
    }
    let p01 = lerp(p0, p1, 0.5);
    let p12 = lerp(p1, p2, 0.5);
    let mid = lerp(p01, p12, 0.5);
    quad_subdivide(p0, p01, mid, tolerance, depth + 1, out);
    quad_subdivide(mid, p12, p2, tolerance, depth + 1, out);
}

fn cubic_flatness(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> f64 {
    flatten_distance(p1, p0, p3).max(flatten_distance(p2, p0, p3))
}

fn cubic_subdivide(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    tolerance: f64,
    depth: u32,
    out: &mut Vec<(f64, f64)>,
) {
    if depth >= MAX_RECURSION || cubic_flatness(p0, p1, p2, p3) <= tolerance {
        out.push(p3);
        return;
    }
    let p01 = lerp(p0, p1, 0.5);
    let p12 = lerp(p1, p2, 0.5);
    let p23 = lerp(p2, p3, 0.5);
    let p012 = lerp(p01, p12, 0.5);
    let p123 = lerp(p12, p23, 0.5);
    let mid = lerp(p012, p123, 0.5);
    cubic_subdivide(p0, p01, p012, mid, tolerance, depth + 1, out);
    cubic_subdivide(mid, p123, p23, p3, tolerance, depth + 1, out);
}

/// Replaces every `Curve3`/`Curve4` with a `LineTo` run approximating it to
/// within `tolerance_px`; `MoveTo`/`LineTo`/`Close`/`End` pass through
/// unchanged. `current` tracks the pen position needed as the curve's start
/// point.
pub fn flatten(commands: &[Command], tolerance_px: f64) -> Vec<Command> {
    let tolerance = tolerance_px.max(1e-6);
    let mut out = Vec::with_capacity(commands.len());
    let mut current = (0.0, 0.0);
    for cmd in commands {
        match *cmd {
            Command::MoveTo { x, y } => {
                current = (x, y);
                out.push(*cmd);
            }
            Command::LineTo { x, y } => {
                current = (x, y);
                out.push(*cmd);
            }
            Command::Curve3 { cx, cy, x, y } => {
                let mut pts = Vec::new();
                quad_subdivide(current, (cx, cy), (x, y), tolerance, 0, &mut pts);
                for (px, py) in pts {
                    out.push(Command::LineTo { x: px, y: py });
                }
                current = (x, y);
            }
            Command::Curve4 { cx1, cy1, cx2, cy2, x, y } => {
                let mut pts = Vec::new();
                cubic_subdivide(current, (cx1, cy1), (cx2, cy2), (x, y), tolerance, 0, &mut pts);
                for (px, py) in pts {
                    out.push(Command::LineTo { x: px, y: py });
                }
                current = (x, y);
            }
            Command::Close => out.push(Command::Close),
            Command::End => out.push(Command::End),
        }
    }
    out
}
