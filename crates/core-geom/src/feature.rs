//! A feature as consumed by the style processor (§3, §6).
//!
//! Lifetime: produced by a `Featureset` iterator (core-datasource), consumed
//! by the symbolizer dispatcher, dropped once every symbolizer of every
//! firing rule has processed it.

use std::collections::HashMap;

use crate::geometry::CachedGeometry;
use crate::value::Value;

/// A raster tile attached to a feature, already decoded to premultiplied or
/// straight RGBA-8 rows (the raster symbolizer path decides which via its
/// own `core-pixel::Color::premultiplied` flag on ingestion).
#[derive(Debug, Clone)]
pub struct RasterTile {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA-8 rows, top-to-bottom, row-major.
    pub rgba: Vec<u8>,
    /// Geographic extent the tile covers, in the same units as the feature's
    /// geometry coordinates would be if it had one.
    pub extent: crate::geometry::BBox,
}

#[derive(Debug)]
pub struct Feature {
    id: i64,
    attributes: HashMap<String, Value>,
    geometry: Option<CachedGeometry>,
    raster: Option<RasterTile>,
}

impl Feature {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            attributes: HashMap::new(),
            geometry: None,
            raster: None,
        }
    }

    pub fn with_geometry(mut self, geometry: crate::geometry::Geometry) -> Self {
        self.geometry = Some(CachedGeometry::new(geometry));
        self
    }

    pub fn with_raster(mut self, raster: RasterTile) -> Self {
        self.raster = Some(raster);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn geometry(&self) -> Option<&CachedGeometry> {
        self.geometry.as_ref()
    }

    pub fn raster(&self) -> Option<&RasterTile> {
        self.raster.as_ref()
    }

    /// Returns `Value::Null` for unknown attribute names, never an error —
    /// symbolizer property expressions must be able to evaluate against a
    /// feature that doesn't carry every attribute a style references.
    pub fn attr(&self, name: &str) -> &Value {
        self.attributes.get(name).unwrap_or(&Value::Null)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|s| s.as_str())
    }
}
