//! The datasource interface itself (§6, consumed — a plugin boundary this
//! crate only specifies, per spec.md's "out of scope (external
//! collaborators)" note on GeoJSON/shapefile/PostGIS backends).

use core_geom::{BBox, Feature};

use crate::error::DatasourceError;
use crate::query::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasourceKind {
    Vector,
    Raster,
}

/// A single-pass iterator of features returned for one `Query` (§6
/// "Featureset::next() -> Option<Feature>"). Not `Send`/shared — a query's
/// lifetime is scoped to one layer's processing on one thread (§5).
pub trait Featureset {
    fn next(&mut self) -> Option<Feature>;
}

/// Exhausts a featureset into a `Vec`, for callers (tests, the demo binary)
/// that don't need streaming consumption.
pub fn collect_all(mut featureset: impl Featureset) -> Vec<Feature> {
    let mut out = Vec::new();
    while let Some(f) = featureset.next() {
        out.push(f);
    }
    out
}

/// A pluggable source of features or raster tiles (§6).
pub trait Datasource {
    fn kind(&self) -> DatasourceKind;
    fn envelope(&self) -> BBox;
    fn features(&self, query: &Query) -> Result<Box<dyn Featureset + '_>, DatasourceError>;
}
