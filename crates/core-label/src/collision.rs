//! The collision detector (§4.G): a bulk-loadable R-tree of placed label
//! boxes, queried before every new placement and cleared per-layer when
//! `clear_label_cache` is set (§4.I).

use core_geom::BBox;
use rstar::{RTree, RTreeObject, AABB};

/// One accepted placement's footprint: a rectangle, an optional key used
/// for duplicate-suppression at a minimum distance, and that distance.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRecord {
    pub bbox: BBox,
    pub key: Option<String>,
    pub min_distance: f64,
}

impl CollisionRecord {
    pub fn new(bbox: BBox) -> Self {
        Self { bbox, key: None, min_distance: 0.0 }
    }

    pub fn with_key(mut self, key: impl Into<String>, min_distance: f64) -> Self {
        self.key = Some(key.into());
        self.min_distance = min_distance;
        self
    }
}

impl RTreeObject for CollisionRecord {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bbox.min_x, self.bbox.min_y], [self.bbox.max_x, self.bbox.max_y])
    }
}

/// Minimum distance between two axis-aligned rectangles; `0.0` when they
/// overlap or touch.
fn rect_distance(a: &BBox, b: &BBox) -> f64 {
    let dx = (a.min_x.max(b.min_x) - a.max_x.min(b.max_x)).max(0.0);
    let dy = (a.min_y.max(b.min_y) - a.max_y.min(b.max_y)).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

/// Owned collision detector; one per render pass, never shared across
/// passes (§5 "the collision detector is owned by the renderer").
#[derive(Debug, Default)]
pub struct CollisionDetector {
    tree: RTree<CollisionRecord>,
    max_min_distance: f64,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bulk_load(records: Vec<CollisionRecord>) -> Self {
        let max_min_distance = records.iter().fold(0.0f64, |m, r| m.max(r.min_distance));
        Self { tree: RTree::bulk_load(records), max_min_distance }
    }

    /// Unconditional add (§4.G `insert`).
    pub fn insert(&mut self, record: CollisionRecord) {
        self.max_min_distance = self.max_min_distance.max(record.min_distance);
        self.tree.insert(record);
    }

    /// Drops every record. Called at detector construction and at layer
    /// start when `clear_label_cache` is set (§4.I).
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.max_min_distance = 0.0;
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// `false` if the tree contains any record whose bbox, expanded by
    /// `margin`, intersects `bbox`, or whose `key` matches `key` and whose
    /// bbox is within that record's `min_distance` of `bbox` (§4.G).
    /// Every record whose bbox intersects `bbox` (§4.H "Debug" symbolizer:
    /// draws the collision boxes currently held by the detector).
    pub fn records_intersecting<'a>(&'a self, bbox: &BBox) -> impl Iterator<Item = &'a CollisionRecord> {
        let query_env = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
        self.tree.locate_in_envelope_intersecting(&query_env)
    }

    pub fn has_placement(&self, bbox: &BBox, key: Option<&str>, margin: f64) -> bool {
        let search_pad = margin.max(self.max_min_distance);
        let query_env = AABB::from_corners(
            [bbox.min_x - search_pad, bbox.min_y - search_pad],
            [bbox.max_x + search_pad, bbox.max_y + search_pad],
        );
        for record in self.tree.locate_in_envelope_intersecting(&query_env) {
            if record.bbox.padded(margin).intersects(bbox) {
                return false;
            }
            if let (Some(k), Some(rk)) = (key, record.key.as_deref()) {
                if k == rk && rect_distance(&record.bbox, bbox) < record.min_distance {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: f64, y: f64, w: f64, h: f64) -> BBox {
        BBox { min_x: x, min_y: y, max_x: x + w, max_y: y + h }
    }

    #[test]
    fn empty_detector_accepts_any_placement() {
        let d = CollisionDetector::new();
        assert!(d.has_placement(&box_at(0.0, 0.0, 20.0, 20.0), None, 0.0));
    }

    #[test]
    fn overlapping_boxes_without_a_key_collide() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 20.0, 20.0)));
        assert!(!d.has_placement(&box_at(10.0, 10.0, 20.0, 20.0), None, 0.0));
    }

    #[test]
    fn non_overlapping_boxes_do_not_collide() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 10.0, 10.0)));
        assert!(d.has_placement(&box_at(100.0, 100.0, 10.0, 10.0), None, 0.0));
    }

    #[test]
    fn margin_extends_the_exclusion_zone() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 10.0, 10.0)));
        // 5 units away: fine with no margin, collides with a 10-unit margin.
        assert!(d.has_placement(&box_at(15.0, 0.0, 10.0, 10.0), None, 0.0));
        assert!(!d.has_placement(&box_at(15.0, 0.0, 10.0, 10.0), None, 10.0));
    }

    #[test]
    fn matching_key_within_min_distance_collides_even_without_overlap() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 10.0, 10.0)).with_key("Main St", 50.0));
        assert!(!d.has_placement(&box_at(30.0, 0.0, 10.0, 10.0), Some("Main St"), 0.0));
        assert!(d.has_placement(&box_at(30.0, 0.0, 10.0, 10.0), Some("Other St"), 0.0));
    }

    #[test]
    fn clear_drops_every_record() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 10.0, 10.0)));
        d.clear();
        assert_eq!(d.len(), 0);
        assert!(d.has_placement(&box_at(0.0, 0.0, 10.0, 10.0), None, 0.0));
    }

    #[test]
    fn records_intersecting_finds_overlapping_boxes_only() {
        let mut d = CollisionDetector::new();
        d.insert(CollisionRecord::new(box_at(0.0, 0.0, 10.0, 10.0)));
        d.insert(CollisionRecord::new(box_at(100.0, 100.0, 10.0, 10.0)));
        let hits: Vec<_> = d.records_intersecting(&box_at(5.0, 5.0, 10.0, 10.0)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bbox, box_at(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn allow_overlap_means_callers_simply_never_check() {
        // §8 property 8: under allow_overlap=true the detector's size equals
        // the candidate count because every candidate gets inserted without
        // ever calling has_placement.
        let mut d = CollisionDetector::new();
        for i in 0..5 {
            d.insert(CollisionRecord::new(box_at(i as f64, i as f64, 20.0, 20.0)));
        }
        assert_eq!(d.len(), 5);
    }
}
