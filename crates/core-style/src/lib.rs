//! Style tree: symbolizers, rules, feature-type styles, layers, and the map
//! that ties them together (§3). `core-render` walks this tree and drives
//! `core-convert`/`core-raster`/`core-pixel` from it; this crate holds no
//! rendering logic of its own.

mod filter;
mod layer;
mod map;
mod pattern;
mod rule;
mod style;
mod symbolizer;
mod transform;
mod value;

pub use filter::{Cmp, Filter};
pub use layer::Layer;
pub use map::Map;
pub use pattern::{ImagePatternSource, PatternSource, WrapMode};
pub use rule::{AttributeCollector, Rule};
pub use style::{max_filter_radius, FeatureTypeStyle, ImageFilter, StyleDict};
pub use symbolizer::{
    BuildingSymbolizer, CommonProps, DebugMode, DebugSymbolizer, GeometryProps, GroupSymbolizer,
    LinePatternSymbolizer, LineSymbolizer, MarkerSymbolizer, PlacementKind, PointSymbolizer,
    PolygonPatternSymbolizer, PolygonSymbolizer, RasterSymbolizer, ShieldSymbolizer, Symbolizer,
    TextSymbolizer,
};
pub use transform::Transform;
pub use value::{FromAttrValue, Property};
