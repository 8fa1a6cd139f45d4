//! Placement search strategies (§4.G). Point placement is
//! `Geometry::representative_point` (core-geom); this module covers the
//! remaining three: line, vertex, and interior (pole-of-inaccessibility).

use core_geom::geometry::{PolygonRings, Ring};

/// One candidate line placement: where to center the label and at what
/// angle (radians, `atan2` convention) to draw its baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacementCandidate {
    pub position: (f64, f64),
    pub angle: f64,
}

fn cumulative_lengths(line: &Ring) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(line.len());
    lengths.push(0.0);
    for w in line.windows(2) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        let seg = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        lengths.push(lengths.last().unwrap() + seg);
    }
    lengths
}

/// Point and tangent angle at arc-length `s` along `line`, or `None` if `s`
/// is outside `[0, total_length]`.
fn sample_at(line: &Ring, lengths: &[f64], s: f64) -> Option<((f64, f64), f64)> {
    if line.len() < 2 || s < 0.0 || s > *lengths.last()? {
        return None;
    }
    let idx = match lengths.binary_search_by(|l| l.partial_cmp(&s).unwrap()) {
        Ok(i) => i.min(line.len() - 2),
        Err(i) => i.saturating_sub(1).min(line.len() - 2),
    };
    let (x0, y0) = line[idx];
    let (x1, y1) = line[idx + 1];
    let seg_len = lengths[idx + 1] - lengths[idx];
    let t = if seg_len > 1e-12 { (s - lengths[idx]) / seg_len } else { 0.0 };
    let point = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
    let angle = (y1 - y0).atan2(x1 - x0);
    Some((point, angle))
}

fn angle_diff(a: f64, b: f64) -> f64 {
    let mut d = (b - a) % std::f64::consts::TAU;
    if d > std::f64::consts::PI {
        d -= std::f64::consts::TAU;
    } else if d < -std::f64::consts::PI {
        d += std::f64::consts::TAU;
    }
    d.abs()
}

/// Walks `line` by arc length, attempting to center a `label_length`-long
/// label every `spacing` pixels; a candidate is rejected (and the cursor
/// advances by `max_error` instead of `spacing`) if the baseline bends more
/// than `max_char_angle_delta` radians across the label's span (§4.G "Line
/// placement").
pub fn line_placements(
    line: &Ring,
    label_length: f64,
    spacing: f64,
    max_error: f64,
    max_char_angle_delta: f64,
) -> Vec<LinePlacementCandidate> {
    if line.len() < 2 || label_length <= 0.0 {
        return Vec::new();
    }
    let lengths = cumulative_lengths(line);
    let total = *lengths.last().unwrap();
    let mut out = Vec::new();
    let mut s = 0.0;
    let step = spacing.max(1e-6);
    let retry_step = max_error.max(1e-6);
    while s + label_length <= total {
        let start = sample_at(line, &lengths, s);
        let mid = sample_at(line, &lengths, s + label_length / 2.0);
        let end = sample_at(line, &lengths, s + label_length);
        match (start, mid, end) {
            (Some((pos, start_angle)), Some((_, mid_angle)), Some((_, end_angle))) => {
                let bend = angle_diff(start_angle, mid_angle).max(angle_diff(mid_angle, end_angle));
                if bend <= max_char_angle_delta {
                    out.push(LinePlacementCandidate { position: pos, angle: start_angle });
                    s += step;
                } else {
                    s += retry_step;
                }
            }
            _ => break,
        }
    }
    out
}

/// One candidate per vertex (§4.G "Vertex placement").
pub fn vertex_placements(line: &Ring) -> Vec<(f64, f64)> {
    line.clone()
}

/// Pole of inaccessibility: the interior point farthest from any boundary
/// edge, found by Mapbox's `polylabel` grid-refinement search (a priority
/// queue of shrinking cells, each ranked by the best distance it could
/// possibly still contain).
pub fn pole_of_inaccessibility(polygon: &PolygonRings, precision: f64) -> (f64, f64) {
    let (min_x, min_y, max_x, max_y) = ring_bbox(&polygon.exterior);
    let width = max_x - min_x;
    let height = max_y - min_y;
    if width <= 0.0 || height <= 0.0 {
        return polygon.exterior.first().copied().unwrap_or((0.0, 0.0));
    }
    let cell_size = width.min(height);
    let mut h = cell_size / 2.0;
    if h <= 0.0 {
        return ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    }

    let mut queue: Vec<Cell> = Vec::new();
    let mut x = min_x;
    while x < max_x {
        let mut y = min_y;
        while y < max_y {
            let cx = x + h;
            let cy = y + h;
            queue.push(make_cell(cx, cy, h, polygon));
            y += cell_size;
        }
        x += cell_size;
    }

    let centroid = polygon_centroid(&polygon.exterior);
    let mut best = make_cell(centroid.0, centroid.1, 0.0, polygon);
    let bbox_cell = make_cell((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, 0.0, polygon);
    if bbox_cell.d > best.d {
        best = bbox_cell;
    }

    let max_iterations = 5000;
    let mut iterations = 0;
    while let Some(pos) = queue.iter().enumerate().max_by(|a, b| a.1.max.partial_cmp(&b.1.max).unwrap()).map(|(i, _)| i) {
        let cell = queue.swap_remove(pos);
        iterations += 1;
        if iterations > max_iterations {
            break;
        }
        if cell.d > best.d {
            best = cell;
        }
        if cell.max - best.d <= precision {
            continue;
        }
        let half = cell.h / 2.0;
        for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            queue.push(make_cell(cell.x + dx * half, cell.y + dy * half, half, polygon));
        }
    }
    (best.x, best.y)
}

struct Cell {
    x: f64,
    y: f64,
    h: f64,
    d: f64,
    max: f64,
}

fn make_cell(x: f64, y: f64, h: f64, polygon: &PolygonRings) -> Cell {
    let d = signed_distance(x, y, polygon);
    let max = d + h * std::f64::consts::SQRT_2;
    Cell { x, y, h, d, max }
}

fn ring_bbox(ring: &Ring) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(x, y) in ring {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    (min_x, min_y, max_x, max_y)
}

fn polygon_centroid(ring: &Ring) -> (f64, f64) {
    let n = ring.len().max(1) as f64;
    let (sx, sy) = ring.iter().fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}

fn point_in_ring(px: f64, py: f64, ring: &Ring) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn point_to_segment_distance(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 1e-12 { (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
    let cx = ax + dx * t;
    let cy = ay + dy * t;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

fn point_to_ring_distance(px: f64, py: f64, ring: &Ring) -> f64 {
    let n = ring.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let (ax, ay) = ring[i];
        let (bx, by) = ring[(i + 1) % n];
        best = best.min(point_to_segment_distance(px, py, ax, ay, bx, by));
    }
    best
}

/// Positive inside the exterior (and outside every hole), negative outside;
/// magnitude is the distance to the nearest boundary edge.
fn signed_distance(px: f64, py: f64, polygon: &PolygonRings) -> f64 {
    let mut inside = point_in_ring(px, py, &polygon.exterior);
    let mut dist = point_to_ring_distance(px, py, &polygon.exterior);
    for hole in &polygon.holes {
        if point_in_ring(px, py, hole) {
            inside = false;
        }
        dist = dist.min(point_to_ring_distance(px, py, hole));
    }
    if inside {
        dist
    } else {
        -dist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_placements_step_by_spacing_along_a_straight_line() {
        let line: Ring = vec![(0.0, 0.0), (100.0, 0.0)];
        let candidates = line_placements(&line, 10.0, 20.0, 2.0, 0.1);
        assert!(candidates.len() >= 3);
        for c in &candidates {
            assert!((c.angle - 0.0).abs() < 1e-9);
        }
    }

    #[test]
    fn line_placements_skip_a_sharp_corner() {
        // An L-shaped line: a label spanning the corner should be rejected
        // at that arc-length and retried past it.
        let line: Ring = vec![(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)];
        let candidates = line_placements(&line, 20.0, 15.0, 1.0, 0.2);
        for c in &candidates {
            assert!(c.position.0 <= 50.0 && c.position.1 <= 50.0);
        }
    }

    #[test]
    fn vertex_placements_returns_every_vertex() {
        let line: Ring = vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
        assert_eq!(vertex_placements(&line), line);
    }

    #[test]
    fn pole_of_a_square_is_its_center() {
        let square = PolygonRings {
            exterior: vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            holes: vec![],
        };
        let (x, y) = pole_of_inaccessibility(&square, 1.0);
        assert!((x - 50.0).abs() < 2.0, "x={x}");
        assert!((y - 50.0).abs() < 2.0, "y={y}");
    }

    #[test]
    fn pole_avoids_a_central_hole() {
        let donut = PolygonRings {
            exterior: vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            holes: vec![vec![(40.0, 40.0), (60.0, 40.0), (60.0, 60.0), (40.0, 60.0)]],
        };
        let (x, y) = pole_of_inaccessibility(&donut, 1.0);
        // should sit off-center, away from the hole, not at (50, 50)
        let dist_from_center = ((x - 50.0).powi(2) + (y - 50.0).powi(2)).sqrt();
        assert!(dist_from_center > 5.0);
    }
}
