//! The geometry tagged union (§3) and its bounding box cache.

use std::cell::Cell;

use crate::vertex::{Command, VecStream, VertexStream};

/// An axis-aligned bounding box in the geometry's native coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(mut self, other: BBox) -> BBox {
        if other.is_empty() {
            return self;
        }
        self.extend(other.min_x, other.min_y);
        self.extend(other.max_x, other.max_y);
        self
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    pub fn padded(&self, pad: f64) -> BBox {
        BBox {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }
}

/// A single closed-or-open ring of coordinates (exterior or hole of a polygon,
/// a line string's vertices, or a point's singleton coordinate pair).
pub type Ring = Vec<(f64, f64)>;

/// A polygon: one exterior ring plus zero or more hole rings.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// The tagged union over every geometry shape the pipeline understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(f64, f64),
    MultiPoint(Vec<(f64, f64)>),
    LineString(Ring),
    MultiLineString(Vec<Ring>),
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
    Collection(Vec<Geometry>),
}

/// Lazily-cached bounding box wrapper. `Geometry` itself stays `PartialEq`-able
/// and cheaply clonable; the cache lives alongside it wherever a feature
/// retains a geometry for more than one query.
#[derive(Debug)]
pub struct CachedGeometry {
    geometry: Geometry,
    bbox: Cell<Option<BBox>>,
}

impl CachedGeometry {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            bbox: Cell::new(None),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bbox(&self) -> BBox {
        if let Some(b) = self.bbox.get() {
            return b;
        }
        let b = self.geometry.compute_bbox();
        self.bbox.set(Some(b));
        b
    }
}

fn ring_to_commands(ring: &Ring, closed: bool, out: &mut Vec<Command>) {
    let mut it = ring.iter();
    if let Some(&(x, y)) = it.next() {
        out.push(Command::MoveTo { x, y });
        for &(x, y) in it {
            out.push(Command::LineTo { x, y });
        }
        if closed {
            out.push(Command::Close);
        }
    }
}

impl Geometry {
    /// Build a `VertexStream` over this geometry's commands, terminated by `End`.
    pub fn vertex_stream(&self) -> impl VertexStream {
        let mut commands = Vec::new();
        self.emit_commands(&mut commands);
        commands.push(Command::End);
        VecStream::new(commands)
    }

    fn emit_commands(&self, out: &mut Vec<Command>) {
        match self {
            Geometry::Point(x, y) => out.push(Command::MoveTo { x: *x, y: *y }),
            Geometry::MultiPoint(pts) => {
                for &(x, y) in pts {
                    out.push(Command::MoveTo { x, y });
                }
            }
            Geometry::LineString(ring) => ring_to_commands(ring, false, out),
            Geometry::MultiLineString(rings) => {
                for ring in rings {
                    ring_to_commands(ring, false, out);
                }
            }
            Geometry::Polygon(poly) => {
                ring_to_commands(&poly.exterior, true, out);
                for hole in &poly.holes {
                    ring_to_commands(hole, true, out);
                }
            }
            Geometry::MultiPolygon(polys) => {
                for poly in polys {
                    ring_to_commands(&poly.exterior, true, out);
                    for hole in &poly.holes {
                        ring_to_commands(hole, true, out);
                    }
                }
            }
            Geometry::Collection(parts) => {
                for part in parts {
                    part.emit_commands(out);
                }
            }
        }
    }

    fn compute_bbox(&self) -> BBox {
        let mut bbox = BBox::empty();
        match self {
            Geometry::Point(x, y) => bbox.extend(*x, *y),
            Geometry::MultiPoint(pts) => pts.iter().for_each(|&(x, y)| bbox.extend(x, y)),
            Geometry::LineString(r) => r.iter().for_each(|&(x, y)| bbox.extend(x, y)),
            Geometry::MultiLineString(rs) => {
                rs.iter().flatten().for_each(|&(x, y)| bbox.extend(x, y))
            }
            Geometry::Polygon(p) => p
                .exterior
                .iter()
                .chain(p.holes.iter().flatten())
                .for_each(|&(x, y)| bbox.extend(x, y)),
            Geometry::MultiPolygon(ps) => {
                for p in ps {
                    p.exterior
                        .iter()
                        .chain(p.holes.iter().flatten())
                        .for_each(|&(x, y)| bbox.extend(x, y));
                }
            }
            Geometry::Collection(parts) => {
                for part in parts {
                    bbox = bbox.union(part.compute_bbox());
                }
            }
        }
        bbox
    }

    /// Representative point for label placement (§4.G): centroid for
    /// polygons, mid-vertex for lines, the point itself for points.
    pub fn representative_point(&self) -> Option<(f64, f64)> {
        match self {
            Geometry::Point(x, y) => Some((*x, *y)),
            Geometry::MultiPoint(pts) => pts.first().copied(),
            Geometry::LineString(r) => r.get(r.len() / 2).copied(),
            Geometry::MultiLineString(rs) => rs.first().and_then(|r| r.get(r.len() / 2)).copied(),
            Geometry::Polygon(p) => ring_centroid(&p.exterior),
            Geometry::MultiPolygon(ps) => ps.first().and_then(|p| ring_centroid(&p.exterior)),
            Geometry::Collection(parts) => parts.first().and_then(|p| p.representative_point()),
        }
    }
}

/// Signed-area-weighted centroid of a closed ring (falls back to the vertex
/// average for degenerate zero-area rings).
fn ring_centroid(ring: &Ring) -> Option<(f64, f64)> {
    if ring.len() < 3 {
        return ring.first().copied();
    }
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % ring.len()];
        let cross = x0 * y1 - x1 * y0;
        area += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    area *= 0.5;
    if area.abs() < 1e-12 {
        let n = ring.len() as f64;
        let (sx, sy) = ring.iter().fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
        return Some((sx / n, sy / n));
    }
    Some((cx / (6.0 * area), cy / (6.0 * area)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_emits_move_line_close_for_exterior_and_each_hole() {
        let geom = Geometry::Polygon(PolygonRings {
            exterior: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            holes: vec![vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0)]],
        });
        let mut stream = geom.vertex_stream();
        let cmds = crate::vertex::collect_all(&mut stream);
        assert_eq!(cmds.iter().filter(|c| c.is_move()).count(), 2);
        assert_eq!(cmds.iter().filter(|c| **c == Command::Close).count(), 2);
        assert!(cmds.last().unwrap().is_end());
    }

    #[test]
    fn bbox_cache_matches_uncached_computation() {
        let geom = Geometry::LineString(vec![(1.0, 2.0), (-3.0, 5.0), (4.0, -1.0)]);
        let cached = CachedGeometry::new(geom.clone());
        assert_eq!(cached.bbox(), geom.compute_bbox());
        // second call hits the cache path; value must still agree.
        assert_eq!(cached.bbox(), geom.compute_bbox());
    }

    #[test]
    fn square_centroid_is_its_center() {
        let ring = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let (cx, cy) = ring_centroid(&ring).unwrap();
        assert!((cx - 5.0).abs() < 1e-9);
        assert!((cy - 5.0).abs() < 1e-9);
    }
}
