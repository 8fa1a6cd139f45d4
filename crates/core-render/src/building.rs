//! The building symbolizer's pseudo-3D extrusion (§4.H "Building"),
//! grounded on mapnik's `building_symbolizer`: face quads drawn back-to-
//! front by sorting each wall edge on its lower endpoint's descending y,
//! a darkened fill for the walls, and a roof polygon shifted up-and-right
//! by the extrusion height's isometric projection.

use core_geom::geometry::{PolygonRings, Ring};
use core_pixel::Color;

/// `height * cos(45deg)`: the constant mapnik uses to turn a building
/// height into a screen-space roof offset under its fixed isometric
/// light angle. Kept verbatim rather than re-derived (§9).
const ROOF_SHIFT_FACTOR: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// One wall quad plus its sort key (the minimum y of its two ground
/// vertices — mapnik draws walls back-to-front, i.e. farthest-first, so a
/// nearer wall's fill always overdraws a farther one's that shares screen
/// space).
pub struct WallFace {
    pub quad: PolygonRings,
    pub sort_y: f64,
}

fn roof_offset(height: f64) -> (f64, f64) {
    let shift = height * ROOF_SHIFT_FACTOR;
    (shift, -shift)
}

/// Builds every wall quad for one polygon ring at `height` screen units,
/// sorted so index 0 paints first (farthest back).
pub fn wall_faces(ring: &Ring, height: f64) -> Vec<WallFace> {
    if height <= 0.0 || ring.len() < 2 {
        return Vec::new();
    }
    let (dx, dy) = roof_offset(height);
    let mut faces: Vec<WallFace> = ring
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            let roof0 = (x0 + dx, y0 + dy);
            let roof1 = (x1 + dx, y1 + dy);
            WallFace {
                quad: PolygonRings { exterior: vec![(x0, y0), (x1, y1), roof1, roof0], holes: Vec::new() },
                sort_y: y0.min(y1),
            }
        })
        .collect();
    // Descending: the face whose lower ground vertex is greatest y (closest
    // to the viewer in a north-up orthographic view) paints last.
    faces.sort_by(|a, b| b.sort_y.partial_cmp(&a.sort_y).unwrap_or(std::cmp::Ordering::Equal));
    faces
}

/// Shifts a ring by the roof offset, producing the roof polygon drawn on
/// top of every wall face.
pub fn roof_ring(ring: &Ring, height: f64) -> Ring {
    let (dx, dy) = roof_offset(height);
    ring.iter().map(|&(x, y)| (x + dx, y + dy)).collect()
}

/// `0.8 * channel`: mapnik's fixed wall-shading factor, applied uniformly
/// to every wall face regardless of its orientation (no per-face lighting
/// model — a deliberate simplification carried over from the original).
pub fn wall_shade(roof_fill: Color) -> Color {
    let scale = |c: u8| ((c as f64) * 0.8).round().clamp(0.0, 255.0) as u8;
    Color::rgba(scale(roof_fill.r), scale(roof_fill.g), scale(roof_fill.b), roof_fill.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_produces_no_wall_faces() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!(wall_faces(&ring, 0.0).is_empty());
    }

    #[test]
    fn wall_faces_are_sorted_by_descending_ground_y() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 20.0), (0.0, 20.0)];
        let faces = wall_faces(&ring, 5.0);
        for w in faces.windows(2) {
            assert!(w[0].sort_y >= w[1].sort_y);
        }
    }

    #[test]
    fn roof_ring_shifts_every_vertex_identically() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0)];
        let roof = roof_ring(&ring, 10.0);
        let shift = 10.0 * ROOF_SHIFT_FACTOR;
        assert!((roof[0].0 - shift).abs() < 1e-9);
        assert!((roof[0].1 - (-shift)).abs() < 1e-9);
        assert!((roof[1].0 - (10.0 + shift)).abs() < 1e-9);
    }

    #[test]
    fn wall_shade_darkens_every_channel_by_the_same_factor() {
        let shaded = wall_shade(Color::rgb(100, 100, 100));
        assert_eq!(shaded.r, 80);
        assert_eq!(shaded.g, 80);
        assert_eq!(shaded.b, 80);
    }
}
