//! The query a feature/style processor issues against a datasource (§6, §4.I
//! step 2b: "open a featureset over the datasource with the query extent and
//! the attribute projection").

use core_geom::BBox;

/// Requested projection of attribute names, or "all of them" when the caller
/// (the rule evaluator, via `AttributeCollector`) has no narrower need.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyNames {
    All,
    Only(Vec<String>),
}

impl PropertyNames {
    pub fn wants(&self, name: &str) -> bool {
        match self {
            PropertyNames::All => true,
            PropertyNames::Only(names) => names.iter().any(|n| n == name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    pub bbox: BBox,
    pub width: u32,
    pub height: u32,
    pub resolution: f64,
    pub property_names: PropertyNames,
    /// Style/rule evaluation variables (e.g. `zoom`) a datasource may use to
    /// pick a generalization level; opaque to this crate.
    pub variables: Vec<(String, f64)>,
    /// Multiplies `bbox` padding before it reaches the datasource, letting a
    /// rule widen the query window for wide strokes/markers near the edge.
    pub filter_factor: f64,
}

impl Query {
    pub fn new(bbox: BBox, width: u32, height: u32) -> Self {
        Self {
            bbox,
            width,
            height,
            resolution: 1.0,
            property_names: PropertyNames::All,
            variables: Vec::new(),
            filter_factor: 1.0,
        }
    }

    pub fn with_property_names(mut self, names: PropertyNames) -> Self {
        self.property_names = names;
        self
    }

    pub fn with_filter_factor(mut self, factor: f64) -> Self {
        self.filter_factor = factor;
        self
    }

    /// The query's effective bbox after `filter_factor` padding (§4.I step 1:
    /// "viewport ∩ layer maximum-extent, padded by buffer-size").
    pub fn effective_bbox(&self) -> BBox {
        if self.filter_factor <= 1.0 {
            return self.bbox;
        }
        let w = self.bbox.max_x - self.bbox.min_x;
        let h = self.bbox.max_y - self.bbox.min_y;
        let pad_x = w * (self.filter_factor - 1.0) / 2.0;
        let pad_y = h * (self.filter_factor - 1.0) / 2.0;
        BBox {
            min_x: self.bbox.min_x - pad_x,
            min_y: self.bbox.min_y - pad_y,
            max_x: self.bbox.max_x + pad_x,
            max_y: self.bbox.max_y + pad_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_all_wants_everything() {
        assert!(PropertyNames::All.wants("anything"));
    }

    #[test]
    fn property_names_only_wants_listed_names() {
        let only = PropertyNames::Only(vec!["name".to_string()]);
        assert!(only.wants("name"));
        assert!(!only.wants("other"));
    }

    #[test]
    fn filter_factor_of_one_leaves_bbox_unchanged() {
        let bbox = BBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        let q = Query::new(bbox, 256, 256);
        assert_eq!(q.effective_bbox(), bbox);
    }

    #[test]
    fn filter_factor_above_one_pads_symmetrically() {
        let bbox = BBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        let q = Query::new(bbox, 256, 256).with_filter_factor(1.2);
        let eff = q.effective_bbox();
        assert!((eff.min_x - (-1.0)).abs() < 1e-9);
        assert!((eff.max_x - 11.0).abs() < 1e-9);
    }
}
