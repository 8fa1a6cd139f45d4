//! Demo scenes: the spec.md §8 S1-S6 end-to-end scenarios plus a small
//! thematic demo combining a polygon, line, building, and text layer —
//! everything `map-renderer render --scene <name>` can produce.

use core_datasource::MemoryDatasource;
use core_geom::geometry::{BBox, Geometry, PolygonRings};
use core_geom::Feature;
use core_pixel::{BlendMode, Color};
use core_style::{
    BuildingSymbolizer, CommonProps, FeatureTypeStyle, GeometryProps, Layer, LineSymbolizer, Map, PlacementKind,
    PolygonSymbolizer, Property, Rule, StyleDict, Symbolizer, TextSymbolizer,
};

fn square_feature(x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
    Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
        exterior: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
        holes: vec![],
    }))
}

/// S1: a 256x256 white canvas with a solid red square `[64,64,192,192]`.
pub fn s1_solid_square() -> Map {
    let mut map = Map::new(256, 256).with_background(Color::rgb(255, 255, 255));
    let mut ds = MemoryDatasource::vector();
    ds.push(square_feature(64.0, 64.0, 192.0, 192.0));

    let mut styles = StyleDict::new();
    styles.insert(FeatureTypeStyle {
        name: "fill".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Polygon(PolygonSymbolizer {
                common: CommonProps { comp_op: BlendMode::SrcOver, ..Default::default() },
                geometry: GeometryProps::default(),
                fill: Property::literal(Color::rgb(255, 0, 0)),
                fill_opacity: Property::literal(1.0),
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    map.styles = styles;
    map.add_layer(Layer::new("square", Box::new(ds)).with_style("fill"));
    map
}

/// S2: a thin horizontal stroke across the canvas midline.
pub fn s2_thin_stroke() -> Map {
    let mut map = Map::new(256, 256).with_background(Color::rgb(255, 255, 255));
    let mut ds = MemoryDatasource::vector();
    ds.push(Feature::new(1).with_geometry(Geometry::LineString(vec![(0.0, 128.0), (256.0, 128.0)])));

    let mut styles = StyleDict::new();
    styles.insert(FeatureTypeStyle {
        name: "stroke".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Line(LineSymbolizer {
                stroke: Property::literal(Color::rgb(0, 0, 0)),
                stroke_width: Property::literal(1.0),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    map.styles = styles;
    map.add_layer(Layer::new("line", Box::new(ds)).with_style("stroke"));
    map
}

/// S3: a dashed horizontal stroke, `[(10, 10)]` in map units.
pub fn s3_dashing() -> Map {
    let mut map = Map::new(100, 20).with_background(Color::rgb(255, 255, 255));
    let mut ds = MemoryDatasource::vector();
    ds.push(Feature::new(1).with_geometry(Geometry::LineString(vec![(0.0, 10.0), (100.0, 10.0)])));

    let mut styles = StyleDict::new();
    styles.insert(FeatureTypeStyle {
        name: "dash".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Line(LineSymbolizer {
                stroke: Property::literal(Color::rgb(0, 0, 0)),
                stroke_width: Property::literal(1.0),
                dasharray: Some(vec![(10.0, 10.0)]),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    map.styles = styles;
    map.add_layer(Layer::new("dash", Box::new(ds)).with_style("dash"));
    map
}

/// S4: an outer frame polygon exceeding the viewport, clipped to it.
pub fn s4_clip() -> Map {
    let mut map = Map::new(256, 256).with_background(Color::rgb(255, 255, 255));
    let mut ds = MemoryDatasource::vector();
    ds.push(Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
        exterior: vec![(-10.0, -10.0), (-10.0, 300.0), (300.0, 300.0), (300.0, -10.0)],
        holes: vec![],
    })));

    let mut styles = StyleDict::new();
    styles.insert(FeatureTypeStyle {
        name: "frame".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Polygon(PolygonSymbolizer {
                common: CommonProps { clip: true, ..Default::default() },
                fill: Property::literal(Color::rgb(0, 128, 0)),
                fill_opacity: Property::literal(1.0),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    map.styles = styles;
    map.add_layer(Layer::new("frame", Box::new(ds)).with_style("frame"));
    map
}

/// A small thematic composite: a land polygon, a road line, a building
/// footprint, and a text label, rendered through every component at once —
/// the scene the README points to as "the whole pipeline, once."
pub fn demo_city() -> Map {
    let mut map = Map::new(400, 300)
        .with_background(Color::rgb(235, 240, 235))
        .with_extent(BBox { min_x: 0.0, min_y: 0.0, max_x: 400.0, max_y: 300.0 });

    let mut land_ds = MemoryDatasource::vector();
    land_ds.push(square_feature(20.0, 20.0, 380.0, 280.0));

    let mut road_ds = MemoryDatasource::vector();
    road_ds.push(Feature::new(1).with_geometry(Geometry::LineString(vec![(20.0, 150.0), (200.0, 150.0), (380.0, 90.0)])));

    let mut building_ds = MemoryDatasource::vector();
    building_ds.push(
        Feature::new(1)
            .with_geometry(Geometry::Polygon(PolygonRings {
                exterior: vec![(150.0, 180.0), (230.0, 180.0), (230.0, 230.0), (150.0, 230.0)],
                holes: vec![],
            }))
            .with_attr("height", 28.0),
    );

    let mut label_ds = MemoryDatasource::vector();
    label_ds.push(Feature::new(1).with_geometry(Geometry::Point(190.0, 205.0)).with_attr("name", "City Hall"));

    let mut styles = StyleDict::new();
    styles.insert(FeatureTypeStyle {
        name: "land".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Polygon(PolygonSymbolizer {
                fill: Property::literal(Color::rgb(222, 234, 211)),
                fill_opacity: Property::literal(1.0),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    styles.insert(FeatureTypeStyle {
        name: "roads".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Line(LineSymbolizer {
                stroke: Property::literal(Color::rgb(120, 120, 120)),
                stroke_width: Property::literal(6.0),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    styles.insert(FeatureTypeStyle {
        name: "buildings".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Building(BuildingSymbolizer {
                fill: Property::literal(Color::rgb(200, 160, 120)),
                height: Property::attr("height", 10.0),
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });
    styles.insert(FeatureTypeStyle {
        name: "labels".to_string(),
        rules: vec![Rule {
            symbolizers: vec![Symbolizer::Text(TextSymbolizer {
                name: Property::attr("name", String::new()),
                size: 12.0,
                placement: PlacementKind::Point,
                ..Default::default()
            })],
            ..Default::default()
        }],
        ..Default::default()
    });

    map.styles = styles;
    map.add_layer(Layer::new("land", Box::new(land_ds)).with_style("land"));
    map.add_layer(Layer::new("roads", Box::new(road_ds)).with_style("roads"));
    map.add_layer(Layer::new("buildings", Box::new(building_ds)).with_style("buildings"));
    map.add_layer(Layer::new("labels", Box::new(label_ds)).with_style("labels"));
    map
}

pub fn by_name(name: &str) -> Option<Map> {
    match name {
        "s1" => Some(s1_solid_square()),
        "s2" => Some(s2_thin_stroke()),
        "s3" => Some(s3_dashing()),
        "s4" => Some(s4_clip()),
        "demo-city" => Some(demo_city()),
        _ => None,
    }
}
