//! Vertex-level clipping (§4.C.1): Liang–Barsky for open polylines,
//! Sutherland–Hodgman for closed polygon rings, both against an axis-aligned
//! rectangle.

use core_geom::vertex::Command;

use crate::subpath::{split_subpaths, Subpath};

#[derive(Debug, Clone, Copy)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Liang–Barsky clip of a single segment against `rect`. Returns the
/// clipped endpoints, or `None` if the segment lies entirely outside.
fn liang_barsky(x0: f64, y0: f64, x1: f64, y1: f64, rect: &ClipRect) -> Option<((f64, f64), (f64, f64))> {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let checks = [
        (-dx, x0 - rect.min_x),
        (dx, rect.max_x - x0),
        (-dy, y0 - rect.min_y),
        (dy, rect.max_y - y0),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    if t0 > t1 {
        return None;
    }
    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

/// Clips each open subpath (line string) against `rect`, splitting it into
/// zero or more surviving runs. Degenerate single-point subpaths are dropped.
pub fn clip_lines(commands: &[Command], rect: &ClipRect) -> Vec<Command> {
    let mut out = Vec::new();
    for sub in split_subpaths(commands) {
        clip_one_line(&sub, rect, &mut out);
    }
    out.push(Command::End);
    out
}

fn clip_one_line(sub: &Subpath, rect: &ClipRect, out: &mut Vec<Command>) {
    if sub.points.len() < 2 {
        return;
    }
    let mut pen_down = false;
    for w in sub.points.windows(2) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        match liang_barsky(x0, y0, x1, y1, rect) {
            Some(((cx0, cy0), (cx1, cy1))) => {
                if !pen_down || (cx0, cy0) != last_point(out) {
                    out.push(Command::MoveTo { x: cx0, y: cy0 });
                }
                out.push(Command::LineTo { x: cx1, y: cy1 });
                pen_down = true;
            }
            None => {
                pen_down = false;
            }
        }
    }
}

fn last_point(out: &[Command]) -> (f64, f64) {
    out.last().and_then(|c| c.terminal()).unwrap_or((f64::NAN, f64::NAN))
}

/// Sutherland–Hodgman clip of a closed ring against `rect`, one half-plane
/// at a time. An entirely-clipped ring yields no commands.
fn clip_ring(points: &[(f64, f64)], rect: &ClipRect) -> Vec<(f64, f64)> {
    let planes: [fn(&ClipRect, f64, f64) -> bool; 4] = [
        |r, x, _y| x >= r.min_x,
        |r, x, _y| x <= r.max_x,
        |r, _x, y| y >= r.min_y,
        |r, _x, y| y <= r.max_y,
    ];
    let intersect: [fn(&ClipRect, (f64, f64), (f64, f64)) -> (f64, f64); 4] = [
        |r, a, b| lerp_x(a, b, r.min_x),
        |r, a, b| lerp_x(a, b, r.max_x),
        |r, a, b| lerp_y(a, b, r.min_y),
        |r, a, b| lerp_y(a, b, r.max_y),
    ];

    let mut poly = points.to_vec();
    for (inside, isect) in planes.into_iter().zip(intersect) {
        if poly.is_empty() {
            break;
        }
        let mut next = Vec::with_capacity(poly.len());
        for i in 0..poly.len() {
            let curr = poly[i];
            let prev = poly[(i + poly.len() - 1) % poly.len()];
            let curr_in = inside(rect, curr.0, curr.1);
            let prev_in = inside(rect, prev.0, prev.1);
            if curr_in {
                if !prev_in {
                    next.push(isect(rect, prev, curr));
                }
                next.push(curr);
            } else if prev_in {
                next.push(isect(rect, prev, curr));
            }
        }
        poly = next;
    }
    poly
}

fn lerp_x(a: (f64, f64), b: (f64, f64), x: f64) -> (f64, f64) {
    let t = (x - a.0) / (b.0 - a.0);
    (x, a.1 + t * (b.1 - a.1))
}

fn lerp_y(a: (f64, f64), b: (f64, f64), y: f64) -> (f64, f64) {
    let t = (y - a.1) / (b.1 - a.1);
    (a.0 + t * (b.0 - a.0), y)
}

/// Clips each closed subpath (polygon ring) against `rect`.
pub fn clip_polygon(commands: &[Command], rect: &ClipRect) -> Vec<Command> {
    let mut out = Vec::new();
    for sub in split_subpaths(commands) {
        if sub.points.len() < 3 {
            continue;
        }
        let clipped = clip_ring(&sub.points, rect);
        if clipped.len() < 3 {
            continue;
        }
        let mut it = clipped.iter();
        let &(x0, y0) = it.next().unwrap();
        out.push(Command::MoveTo { x: x0, y: y0 });
        for &(x, y) in it {
            out.push(Command::LineTo { x, y });
        }
        out.push(Command::Close);
    }
    out.push(Command::End);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ClipRect {
        ClipRect { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 }
    }

    #[test]
    fn line_fully_inside_is_unchanged() {
        let cmds = vec![
            Command::MoveTo { x: 1.0, y: 1.0 },
            Command::LineTo { x: 5.0, y: 5.0 },
            Command::End,
        ];
        let out = clip_lines(&cmds, &rect());
        assert_eq!(
            out,
            vec![
                Command::MoveTo { x: 1.0, y: 1.0 },
                Command::LineTo { x: 5.0, y: 5.0 },
                Command::End,
            ]
        );
    }

    #[test]
    fn line_crossing_boundary_is_truncated() {
        let cmds = vec![
            Command::MoveTo { x: -5.0, y: 5.0 },
            Command::LineTo { x: 5.0, y: 5.0 },
            Command::End,
        ];
        let out = clip_lines(&cmds, &rect());
        assert_eq!(out[0], Command::MoveTo { x: 0.0, y: 5.0 });
        assert_eq!(out[1], Command::LineTo { x: 5.0, y: 5.0 });
    }

    #[test]
    fn square_ring_outside_rect_is_dropped() {
        let cmds = vec![
            Command::MoveTo { x: 100.0, y: 100.0 },
            Command::LineTo { x: 110.0, y: 100.0 },
            Command::LineTo { x: 110.0, y: 110.0 },
            Command::Close,
            Command::End,
        ];
        let out = clip_polygon(&cmds, &rect());
        assert_eq!(out, vec![Command::End]);
    }

    #[test]
    fn square_ring_crossing_corner_is_clipped_to_a_valid_polygon() {
        let cmds = vec![
            Command::MoveTo { x: 5.0, y: 5.0 },
            Command::LineTo { x: 20.0, y: 5.0 },
            Command::LineTo { x: 20.0, y: 20.0 },
            Command::LineTo { x: 5.0, y: 20.0 },
            Command::Close,
            Command::End,
        ];
        let out = clip_polygon(&cmds, &rect());
        assert!(out.iter().any(|c| *c == Command::Close));
        for c in &out {
            if let Some((x, y)) = c.terminal() {
                assert!(x <= 10.0001 && y <= 10.0001);
            }
        }
    }
}
