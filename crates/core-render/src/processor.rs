//! The outer render loop (§4.I): layers, styles, rules, features,
//! symbolizers, in that nesting order, with if/else rule partitioning and
//! style-level private buffers for image filters and compositing.

use core_datasource::{collect_all, PropertyNames, Query};
use core_font::FontEngine;
use core_geom::Feature;
use core_label::CollisionDetector;
use core_pixel::{composite, PixelBuffer, Rgba8};
use core_style::{AttributeCollector, Map, Rule};
use glam::{Affine2, Vec2};

use crate::cancellation::CancellationToken;
use crate::dispatch::{dispatch, RenderContext};
use crate::error::RenderError;
use crate::raster_path;
use crate::scale::scale_denominator;
use crate::style_buffer::{image_filter_border, StyleBuffer};

/// Partitions a style's rules into the ones that fired for `feature` at
/// `scale_denominator`, honoring if/else semantics (§3, §4.I step 2c): a
/// rule with `else_filter` set fires only when every non-else rule in the
/// same style missed.
fn firing_rules<'a>(rules: &'a [Rule], feature: &Feature, scale_denominator: f64) -> Vec<&'a Rule> {
    let mut fired = Vec::new();
    let mut any_non_else_matched = false;
    for rule in rules.iter().filter(|r| !r.else_filter) {
        if rule.in_scale(scale_denominator) && rule.filter.eval(feature) {
            fired.push(rule);
            any_non_else_matched = true;
        }
    }
    if !any_non_else_matched {
        for rule in rules.iter().filter(|r| r.else_filter) {
            if rule.in_scale(scale_denominator) {
                fired.push(rule);
            }
        }
    }
    fired
}

/// Runs one `FeatureTypeStyle` over every feature of a layer into a fresh
/// style buffer, applies its image filter chain, then composites the
/// result onto `target` through the style's `comp_op`/`opacity` (§4.I
/// "style-level compositing").
#[allow(clippy::too_many_arguments)]
fn render_style(
    style: &core_style::FeatureTypeStyle,
    features: &[Feature],
    view: Affine2,
    target: &mut PixelBuffer<Rgba8>,
    collision: &mut CollisionDetector,
    fonts: &dyn FontEngine,
    curve_tolerance: f64,
    gamma: core_raster::Gamma,
    scale_denom: f64,
    cancellation: &CancellationToken,
) -> Result<(), RenderError> {
    let border = image_filter_border(&style.image_filters);
    let mut style_buffer = StyleBuffer::new(target.width(), target.height(), border);
    let offset_view = Affine2::from_translation(Vec2::new(border as f32, border as f32)) * view;

    {
        let mut ctx = RenderContext {
            target: style_buffer.buffer_mut(),
            view: offset_view,
            curve_tolerance,
            collision,
            fonts,
            gamma,
        };
        for feature in features {
            if cancellation.is_cancelled() {
                return Err(RenderError::Cancelled);
            }
            for rule in firing_rules(&style.rules, feature, scale_denom) {
                for symbolizer in &rule.symbolizers {
                    if let core_style::Symbolizer::Raster(raster_sym) = symbolizer {
                        raster_path::render_raster(raster_sym, feature, &mut ctx);
                    } else {
                        dispatch(symbolizer, feature, &mut ctx);
                    }
                }
            }
        }
    }

    for filter in &style.image_filters {
        filter.apply(style_buffer.buffer_mut());
    }

    composite(target, style_buffer.buffer(), style.comp_op, style.opacity, -(border as i64), -(border as i64));
    Ok(())
}

/// Drives every layer of `map` in declared order into `target` (§4.I steps
/// 1-3). `view` is the map's view affine (extent -> screen), already
/// incorporating the map's device scale factor.
pub fn render_map(
    map: &Map,
    view: Affine2,
    target: &mut PixelBuffer<Rgba8>,
    fonts: &dyn FontEngine,
    curve_tolerance: f64,
    gamma: core_raster::Gamma,
    cancellation: &CancellationToken,
) -> Result<(), RenderError> {
    let scale_denom = scale_denominator(map.extent.max_x - map.extent.min_x, map.width);
    let mut collision = CollisionDetector::new();

    for layer in &map.layers {
        if cancellation.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        if !layer.in_scale(scale_denom) {
            continue;
        }
        if layer.clear_label_cache {
            collision.clear();
        }

        let mut collector = AttributeCollector::new();
        let mut styles = Vec::new();
        for name in &layer.style_names {
            let style = map.styles.get(name).ok_or_else(|| RenderError::UnknownStyle {
                layer: layer.name.clone(),
                style: name.clone(),
            })?;
            for rule in &style.rules {
                collector.visit_rule(rule);
            }
            styles.push(style);
        }
        let property_names = PropertyNames::Only(collector.into_names());

        let query = Query::new(map.extent, map.width, map.height).with_property_names(property_names);
        let featureset = match layer.datasource.features(&query) {
            Ok(fs) => fs,
            Err(source) => {
                // §7 DatasourceIOError: surfaced as a warning, the layer is
                // skipped, and subsequent layers still render. A caller that
                // wants render-aborting behavior can make its datasource
                // return the error eagerly from `Map` construction instead.
                tracing::warn!(target: "datasource", layer = %layer.name, error = %source, "datasource query failed, skipping layer");
                continue;
            }
        };
        let features = collect_all(featureset);

        for style in styles {
            render_style(style, &features, view, target, &mut collision, fonts, curve_tolerance, gamma, scale_denom, cancellation)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::geometry::{Geometry, PolygonRings};
    use core_pixel::Color;
    use core_style::{CommonProps, FeatureTypeStyle, Filter, GeometryProps, Layer, PolygonSymbolizer, Property, StyleDict, Symbolizer};
    use core_datasource::MemoryDatasource;

    #[test]
    fn else_rule_only_fires_when_every_sibling_missed() {
        let feature = Feature::new(1).with_attr("kind", "river");
        let matching = Rule { filter: Filter::Cmp(core_style::Cmp::Eq, "kind".into(), core_geom::Value::Text("river".into())), ..Default::default() };
        let else_rule = Rule { else_filter: true, ..Default::default() };
        let fired = firing_rules(&[matching.clone(), else_rule.clone()], &feature, 0.0);
        assert_eq!(fired.len(), 1);

        let other_feature = Feature::new(2).with_attr("kind", "road");
        let fired = firing_rules(&[matching, else_rule], &other_feature, 0.0);
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn render_map_paints_a_simple_polygon_layer() {
        let mut ds = MemoryDatasource::vector();
        ds.push(Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
            exterior: vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            holes: vec![],
        })));
        let mut map = Map::new(64, 64);
        let mut styles = StyleDict::new();
        styles.insert(FeatureTypeStyle {
            name: "fill".to_string(),
            rules: vec![Rule {
                symbolizers: vec![Symbolizer::Polygon(PolygonSymbolizer {
                    common: CommonProps::default(),
                    geometry: GeometryProps::default(),
                    fill: Property::literal(Color::rgb(10, 20, 30)),
                    fill_opacity: Property::literal(1.0),
                })],
                ..Default::default()
            }],
            ..Default::default()
        });
        map.styles = styles;
        map.add_layer(Layer::new("l", Box::new(ds)).with_style("fill"));

        let view = core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 64.0, 64.0, 1.0);
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(64, 64);
        let fonts = core_font::StubFontEngine;
        render_map(&map, view, &mut target, &fonts, 0.25, core_raster::Gamma::default(), &CancellationToken::none()).unwrap();
        assert!(target.get(32, 32).unwrap().a > 0);
    }

    #[test]
    fn render_map_reports_an_unknown_style_name() {
        let ds = MemoryDatasource::vector();
        let mut map = Map::new(16, 16);
        map.add_layer(Layer::new("l", Box::new(ds)).with_style("missing"));
        let view = core_convert::view_affine(0.0, 0.0, 16.0, 16.0, 16.0, 16.0, 1.0);
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(16, 16);
        let fonts = core_font::StubFontEngine;
        let result = render_map(&map, view, &mut target, &fonts, 0.25, core_raster::Gamma::default(), &CancellationToken::none());
        assert!(matches!(result, Err(RenderError::UnknownStyle { .. })));
    }
}
