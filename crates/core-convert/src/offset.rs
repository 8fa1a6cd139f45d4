//! Parallel-curve offset (§4.C.6): shifts a flattened polyline by a signed
//! distance along its per-segment normal, mitering interior vertices.

use core_geom::vertex::Command;

use crate::subpath::{join_subpaths, split_subpaths, Subpath};

fn normal(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        (0.0, 0.0)
    } else {
        (-dy / len, dx / len)
    }
}

fn offset_points(points: &[(f64, f64)], closed: bool, distance: f64) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 2 || distance == 0.0 {
        return points.to_vec();
    }
    let segment_count = if closed { n } else { n - 1 };
    let normals: Vec<(f64, f64)> = (0..segment_count)
        .map(|i| normal(points[i], points[(i + 1) % n]))
        .collect();

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev_normal = if i == 0 {
            if closed { normals[segment_count - 1] } else { normals[0] }
        } else {
            normals[(i - 1).min(segment_count - 1)]
        };
        let next_normal = if i < segment_count { normals[i] } else { normals[segment_count - 1] };

        let avg = (
            (prev_normal.0 + next_normal.0) * 0.5,
            (prev_normal.1 + next_normal.1) * 0.5,
        );
        let avg_len = (avg.0 * avg.0 + avg.1 * avg.1).sqrt();
        // Miter: scale the averaged normal so its projection back onto
        // either single-segment normal has unit length (AGG's
        // `vcgen_contour` bisector-scaling identity), falling back to that
        // segment's own normal at a sharp fold where the bisector degenerates.
        let miter = if avg_len > 1e-6 {
            let scale = 1.0 / avg_len;
            (avg.0 * scale, avg.1 * scale)
        } else {
            next_normal
        };
        out.push((points[i].0 + miter.0 * distance, points[i].1 + miter.1 * distance));
    }
    out
}

/// Offsets every subpath in `commands` by `distance` pixels (positive to the
/// left of travel direction, matching the normal's right-hand rotation).
/// Assumes curves have already been flattened to `LineTo`.
pub fn offset(commands: &[Command], distance: f64) -> Vec<Command> {
    let subs: Vec<Subpath> = split_subpaths(commands)
        .into_iter()
        .map(|sub| Subpath {
            points: offset_points(&sub.points, sub.closed, distance),
            closed: sub.closed,
        })
        .collect();
    join_subpaths(&subs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsetting_a_horizontal_segment_shifts_it_vertically() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::End,
        ];
        let out = offset(&cmds, 2.0);
        match (out[0], out[1]) {
            (Command::MoveTo { y: y0, .. }, Command::LineTo { y: y1, .. }) => {
                assert!((y0 - 2.0).abs() < 1e-9);
                assert!((y1 - 2.0).abs() < 1e-9);
            }
            _ => panic!("unexpected commands"),
        }
    }

    #[test]
    fn zero_distance_is_a_no_op() {
        let cmds = vec![
            Command::MoveTo { x: 1.0, y: 2.0 },
            Command::LineTo { x: 3.0, y: 4.0 },
            Command::End,
        ];
        assert_eq!(offset(&cmds, 0.0), cmds);
    }
}
