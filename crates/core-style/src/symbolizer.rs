//! The symbolizer sum type (§3, §6) and its per-variant property
//! vocabulary. One arm per spec.md §3 variant; the dispatch site that
//! matches on this enum lives in `core-render` (§9 "visitor-over-tagged-
//! union ... model as an enum with one match arm").

use core_convert::{DashPattern, LineCap, LineJoin, SmoothAlgorithm};
use core_pixel::{BlendMode, Color};

use crate::pattern::WrapMode;
use crate::transform::Transform;
use crate::value::Property;

/// §6 `placement` values, shared by marker/text/shield symbolizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Point,
    Line,
    Vertex,
    Interior,
}

impl Default for PlacementKind {
    fn default() -> Self {
        PlacementKind::Point
    }
}

/// Fields every symbolizer carries per §6's `opacity`/`comp-op`/`clip`
/// table entries, factored out so each variant struct embeds one instead of
/// repeating the same four fields.
#[derive(Debug, Clone)]
pub struct CommonProps {
    pub opacity: f64,
    pub comp_op: BlendMode,
    pub clip: bool,
    pub transform: Transform,
}

impl Default for CommonProps {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            comp_op: BlendMode::SrcOver,
            clip: true,
            transform: Transform::Identity,
        }
    }
}

/// The converter-chain stage toggles §4.H's Polygon/Line/Pattern rows share
/// (`simplify?`, `smooth?`).
#[derive(Debug, Clone, Default)]
pub struct GeometryProps {
    pub simplify_tolerance: Option<f64>,
    pub smooth: Option<(SmoothAlgorithm, f64)>,
}

#[derive(Debug, Clone)]
pub struct PolygonSymbolizer {
    pub common: CommonProps,
    pub geometry: GeometryProps,
    pub fill: Property<Color>,
    pub fill_opacity: Property<f64>,
}

impl Default for PolygonSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            geometry: GeometryProps::default(),
            fill: Property::literal(Color::rgb(128, 128, 128)),
            fill_opacity: Property::literal(1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineSymbolizer {
    pub common: CommonProps,
    pub geometry: GeometryProps,
    pub stroke: Property<Color>,
    pub stroke_width: Property<f64>,
    pub stroke_opacity: Property<f64>,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub dasharray: Option<DashPattern>,
    pub offset: Option<f64>,
}

impl Default for LineSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            geometry: GeometryProps::default(),
            stroke: Property::literal(Color::rgb(0, 0, 0)),
            stroke_width: Property::literal(1.0),
            stroke_opacity: Property::literal(1.0),
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            dasharray: None,
            offset: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolygonPatternSymbolizer {
    pub common: CommonProps,
    pub geometry: GeometryProps,
    pub file: String,
    pub wrap: WrapMode,
}

#[derive(Debug, Clone)]
pub struct LinePatternSymbolizer {
    pub common: CommonProps,
    pub geometry: GeometryProps,
    pub file: String,
    pub wrap: WrapMode,
}

/// A raster image dropped at a point without the full marker path-tree
/// machinery (mapnik's `point_symbolizer`, as distinct from the vector
/// `marker_symbolizer`).
#[derive(Debug, Clone)]
pub struct PointSymbolizer {
    pub common: CommonProps,
    pub file: String,
    pub allow_overlap: bool,
    pub ignore_placement: bool,
}

#[derive(Debug, Clone)]
pub struct MarkerSymbolizer {
    pub common: CommonProps,
    /// `None` selects the built-in placeholder vector used by the
    /// `MissingAsset` policy (§7) when no `file` is configured at all.
    pub file: Option<String>,
    pub fill: Property<Color>,
    pub fill_opacity: Property<f64>,
    pub stroke: Property<Color>,
    pub stroke_width: Property<f64>,
    pub width: f64,
    pub height: f64,
    pub placement: PlacementKind,
    pub spacing: f64,
    pub max_error: f64,
    pub allow_overlap: bool,
    pub ignore_placement: bool,
}

impl Default for MarkerSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            file: None,
            fill: Property::literal(Color::rgb(0, 0, 255)),
            fill_opacity: Property::literal(1.0),
            stroke: Property::literal(Color::rgb(0, 0, 0)),
            stroke_width: Property::literal(0.5),
            width: 10.0,
            height: 10.0,
            placement: PlacementKind::Point,
            spacing: 100.0,
            max_error: 5.0,
            allow_overlap: false,
            ignore_placement: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RasterSymbolizer {
    pub common: CommonProps,
    pub scaling: core_resample::Filter,
    pub mesh_size: u32,
}

impl Default for RasterSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            scaling: core_resample::Filter::Bilinear,
            mesh_size: core_resample::DEFAULT_MESH_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextSymbolizer {
    pub common: CommonProps,
    /// The attribute whose value is rendered as the label text (almost
    /// always an `Attr` property; `Literal` covers a fixed caption).
    pub name: Property<String>,
    pub face_name: String,
    pub size: f64,
    pub fill: Color,
    pub halo_fill: Option<Color>,
    pub halo_radius: f64,
    pub placement: PlacementKind,
    pub spacing: f64,
    pub max_error: f64,
    pub max_char_angle_delta: f64,
    pub allow_overlap: bool,
    pub ignore_placement: bool,
    pub min_distance: f64,
}

impl Default for TextSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            name: Property::literal(String::new()),
            face_name: "sans".to_string(),
            size: 10.0,
            fill: Color::rgb(0, 0, 0),
            halo_fill: None,
            halo_radius: 0.0,
            placement: PlacementKind::Point,
            spacing: 100.0,
            max_error: 5.0,
            max_char_angle_delta: std::f64::consts::FRAC_PI_4,
            allow_overlap: false,
            ignore_placement: false,
            min_distance: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShieldSymbolizer {
    pub text: TextSymbolizer,
    pub file: String,
    pub unlock_image: bool,
}

#[derive(Debug, Clone)]
pub struct BuildingSymbolizer {
    pub common: CommonProps,
    pub fill: Property<Color>,
    pub height: Property<f64>,
}

impl Default for BuildingSymbolizer {
    fn default() -> Self {
        Self {
            common: CommonProps::default(),
            fill: Property::literal(Color::rgb(153, 153, 153)),
            height: Property::literal(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMode {
    Collision,
    Vertex,
}

#[derive(Debug, Clone)]
pub struct DebugSymbolizer {
    pub mode: DebugMode,
}

/// The group symbolizer's child-thunk layout (§4.H "defers to child
/// symbolizer thunks with a shared layout"; supplemented per SPEC_FULL with
/// the original's repeat-key/spacing fields so `Group` is not a dead arm).
#[derive(Debug, Clone)]
pub struct GroupSymbolizer {
    pub children: Vec<Symbolizer>,
    pub repeat_key: Option<String>,
    pub spacing: f64,
}

#[derive(Debug, Clone)]
pub enum Symbolizer {
    Polygon(PolygonSymbolizer),
    Line(LineSymbolizer),
    PolygonPattern(PolygonPatternSymbolizer),
    LinePattern(LinePatternSymbolizer),
    Point(PointSymbolizer),
    Marker(MarkerSymbolizer),
    Raster(RasterSymbolizer),
    Text(TextSymbolizer),
    Shield(ShieldSymbolizer),
    Building(BuildingSymbolizer),
    Debug(DebugSymbolizer),
    Group(GroupSymbolizer),
}

impl Symbolizer {
    /// Attribute names this symbolizer's property values read, for
    /// `AttributeCollector`.
    pub fn referenced_attrs(&self, out: &mut Vec<String>) {
        let mut push = |p: Option<&str>| {
            if let Some(name) = p {
                out.push(name.to_string());
            }
        };
        match self {
            Symbolizer::Polygon(s) => {
                push(s.fill.referenced_attr());
                push(s.fill_opacity.referenced_attr());
            }
            Symbolizer::Line(s) => {
                push(s.stroke.referenced_attr());
                push(s.stroke_width.referenced_attr());
                push(s.stroke_opacity.referenced_attr());
            }
            Symbolizer::PolygonPattern(_) | Symbolizer::LinePattern(_) => {}
            Symbolizer::Point(_) => {}
            Symbolizer::Marker(s) => {
                push(s.fill.referenced_attr());
                push(s.fill_opacity.referenced_attr());
                push(s.stroke.referenced_attr());
                push(s.stroke_width.referenced_attr());
            }
            Symbolizer::Raster(_) => {}
            Symbolizer::Text(s) => push(s.name.referenced_attr()),
            Symbolizer::Shield(s) => push(s.text.name.referenced_attr()),
            Symbolizer::Building(s) => {
                push(s.fill.referenced_attr());
                push(s.height.referenced_attr());
            }
            Symbolizer::Debug(_) => {}
            Symbolizer::Group(s) => {
                for child in &s.children {
                    child.referenced_attrs(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_symbolizer_collects_its_attribute_refs() {
        let s = Symbolizer::Polygon(PolygonSymbolizer {
            fill: Property::attr("color", Color::rgb(0, 0, 0)),
            ..Default::default()
        });
        let mut names = Vec::new();
        s.referenced_attrs(&mut names);
        assert_eq!(names, vec!["color".to_string()]);
    }

    #[test]
    fn group_symbolizer_collects_from_every_child() {
        let child = Symbolizer::Building(BuildingSymbolizer {
            height: Property::attr("levels", 1.0),
            ..Default::default()
        });
        let group = Symbolizer::Group(GroupSymbolizer { children: vec![child], repeat_key: None, spacing: 0.0 });
        let mut names = Vec::new();
        group.referenced_attrs(&mut names);
        assert_eq!(names, vec!["levels".to_string()]);
    }
}
