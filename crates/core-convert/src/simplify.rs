//! Douglas–Peucker simplification (§4.C.4), tolerance in pixels. Operates
//! per subpath and always preserves the subpath's `MoveTo`/`Close` framing —
//! only interior vertices are eligible for removal.

use core_geom::vertex::Command;

use crate::subpath::{join_subpaths, split_subpaths, Subpath};

fn perpendicular_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        let (ex, ey) = (p.0 - a.0, p.1 - a.1);
        return (ex * ex + ey * ey).sqrt();
    }
    let num = (dy * p.0 - dx * p.1 + b.0 * a.1 - b.1 * a.0).abs();
    num / len_sq.sqrt()
}

fn dp_recurse(points: &[(f64, f64)], tolerance: f64, keep: &mut [bool]) {
    if points.len() < 3 {
        return;
    }
    let (first, last) = (points[0], points[points.len() - 1]);
    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, &p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > tolerance {
        keep[max_idx] = true;
        dp_recurse(&points[..=max_idx], tolerance, &mut keep[..=max_idx]);
        dp_recurse(&points[max_idx..], tolerance, &mut keep[max_idx..]);
    }
}

fn simplify_points(points: &[(f64, f64)], tolerance: f64) -> Vec<(f64, f64)> {
    if points.len() < 3 || tolerance <= 0.0 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    *keep.last_mut().unwrap() = true;
    dp_recurse(points, tolerance, &mut keep);
    points
        .iter()
        .zip(keep.iter())
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}

pub fn simplify(commands: &[Command], tolerance_px: f64) -> Vec<Command> {
    let subs: Vec<Subpath> = split_subpaths(commands)
        .into_iter()
        .map(|sub| Subpath {
            points: simplify_points(&sub.points, tolerance_px),
            closed: sub.closed,
        })
        .collect();
    join_subpaths(&subs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_interior_points_are_removed() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 1.0, y: 0.01 },
            Command::LineTo { x: 2.0, y: -0.01 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::End,
        ];
        let out = simplify(&cmds, 1.0);
        assert_eq!(out.len(), 3); // MoveTo, LineTo, End
    }

    #[test]
    fn a_sharp_corner_survives_simplification() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 5.0, y: 10.0 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::End,
        ];
        let out = simplify(&cmds, 1.0);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn endpoints_are_always_preserved() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 0.001, y: 0.0 },
            Command::LineTo { x: 0.002, y: 0.0 },
            Command::End,
        ];
        let out = simplify(&cmds, 5.0);
        assert_eq!(out.first().unwrap().terminal(), Some((0.0, 0.0)));
        assert_eq!(out[out.len() - 2].terminal(), Some((0.002, 0.0)));
    }
}
