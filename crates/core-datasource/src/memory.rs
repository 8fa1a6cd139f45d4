//! An in-memory vector datasource (§6, used by tests, the demo binary, and
//! as a stand-in wherever a GeoJSON/shapefile/PostGIS plugin would sit).

use std::collections::HashMap;

use core_geom::{BBox, CachedGeometry, Feature, Geometry, RasterTile, Value};

use crate::datasource::{Datasource, DatasourceKind, Featureset};
use crate::error::DatasourceError;
use crate::query::{PropertyNames, Query};

/// One record held by `MemoryDatasource`, stored in a form that can be
/// rebuilt into a fresh `Feature` per query (a `Feature` itself is
/// single-consumption, owned by the symbolizer dispatcher for its lifetime).
struct Record {
    id: i64,
    attributes: HashMap<String, Value>,
    geometry: Option<Geometry>,
    raster: Option<RasterTile>,
}

/// A fixed collection of features held entirely in memory, queried by bbox
/// intersection and attribute projection. `envelope()` is the union bbox of
/// every stored geometry, updated incrementally as features are pushed.
pub struct MemoryDatasource {
    kind: DatasourceKind,
    records: Vec<Record>,
    envelope: BBox,
}

impl MemoryDatasource {
    pub fn new(kind: DatasourceKind) -> Self {
        Self { kind, records: Vec::new(), envelope: BBox::empty() }
    }

    pub fn vector() -> Self {
        Self::new(DatasourceKind::Vector)
    }

    pub fn raster() -> Self {
        Self::new(DatasourceKind::Raster)
    }

    pub fn push(&mut self, feature: Feature) {
        let geometry = feature.geometry().map(|g| g.geometry().clone());
        if let Some(g) = &geometry {
            self.envelope = self.envelope.union(CachedGeometry::new(g.clone()).bbox());
        }
        if let Some(raster) = feature.raster() {
            self.envelope = self.envelope.union(raster.extent);
        }
        let attributes: HashMap<String, Value> =
            feature.attribute_names().map(|n| (n.to_string(), feature.attr(n).clone())).collect();
        self.records.push(Record { id: feature.id(), attributes, geometry, raster: feature.raster().cloned() });
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.push(feature);
        self
    }

    fn record_bbox(record: &Record) -> Option<BBox> {
        record.geometry.as_ref().map(|g| CachedGeometry::new(g.clone()).bbox()).or(record.raster.as_ref().map(|r| r.extent))
    }
}

impl Datasource for MemoryDatasource {
    fn kind(&self) -> DatasourceKind {
        self.kind
    }

    fn envelope(&self) -> BBox {
        self.envelope
    }

    fn features(&self, query: &Query) -> Result<Box<dyn Featureset + '_>, DatasourceError> {
        let effective = query.effective_bbox();
        let matches: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| Self::record_bbox(r).map(|b| b.intersects(&effective)).unwrap_or(true))
            .map(|(i, _)| i)
            .collect();
        Ok(Box::new(MemoryFeatureset { source: self, property_names: query.property_names.clone(), matches, pos: 0 }))
    }
}

struct MemoryFeatureset<'a> {
    source: &'a MemoryDatasource,
    property_names: PropertyNames,
    matches: Vec<usize>,
    pos: usize,
}

impl<'a> Featureset for MemoryFeatureset<'a> {
    fn next(&mut self) -> Option<Feature> {
        let idx = *self.matches.get(self.pos)?;
        self.pos += 1;
        let record = &self.source.records[idx];
        let mut feature = Feature::new(record.id);
        for (name, value) in &record.attributes {
            if self.property_names.wants(name) {
                feature = feature.with_attr(name.clone(), value.clone());
            }
        }
        if let Some(geometry) = &record.geometry {
            feature = feature.with_geometry(geometry.clone());
        }
        if let Some(raster) = &record.raster {
            feature = feature.with_raster(raster.clone());
        }
        Some(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_feature(id: i64, x: f64, y: f64) -> Feature {
        Feature::new(id).with_geometry(Geometry::Point(x, y))
    }

    #[test]
    fn feature_outside_query_bbox_is_excluded() {
        let mut ds = MemoryDatasource::vector();
        ds.push(point_feature(1, 5.0, 5.0));
        ds.push(point_feature(2, 500.0, 500.0));
        let query = Query::new(BBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 }, 256, 256);
        let results = crate::datasource::collect_all(ds.features(&query).unwrap());
        assert_eq!(results.iter().map(|f| f.id()).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn envelope_unions_every_stored_feature() {
        let ds = MemoryDatasource::vector().with_feature(point_feature(1, 0.0, 0.0)).with_feature(point_feature(2, 100.0, 100.0));
        let env = ds.envelope();
        assert_eq!(env.max_x, 100.0);
        assert_eq!(env.max_y, 100.0);
    }

    #[test]
    fn attributes_survive_the_round_trip() {
        let ds = MemoryDatasource::vector().with_feature(point_feature(1, 1.0, 1.0).with_attr("name", "alpha"));
        let query = Query::new(BBox { min_x: -10.0, min_y: -10.0, max_x: 10.0, max_y: 10.0 }, 256, 256);
        let results = crate::datasource::collect_all(ds.features(&query).unwrap());
        assert_eq!(results[0].attr("name").as_str(), Some("alpha"));
    }

    #[test]
    fn property_projection_drops_unrequested_attributes() {
        let ds = MemoryDatasource::vector()
            .with_feature(point_feature(1, 1.0, 1.0).with_attr("name", "alpha").with_attr("population", 100i64));
        let query = Query::new(BBox { min_x: -10.0, min_y: -10.0, max_x: 10.0, max_y: 10.0 }, 256, 256)
            .with_property_names(PropertyNames::Only(vec!["name".to_string()]));
        let results = crate::datasource::collect_all(ds.features(&query).unwrap());
        assert_eq!(results[0].attr("name").as_str(), Some("alpha"));
        assert!(results[0].attr("population").is_null());
    }
}
