//! Symbolizer dispatch (§4.H): one function per `Symbolizer` variant,
//! driving `core-convert`'s chains, `core-raster`'s rasterizer, and
//! `core-pixel`'s compositor. The match in `dispatch` replaces the
//! ancestor's visitor double-dispatch with a single enum match (§9).

use core_convert::{run_line_chain, run_polygon_chain, to_stream, ConverterChain, LineCap, LineJoin, StrokeStyle};
use core_font::{Face, FaceSet, FontEngine, Glyph};
use core_geom::geometry::{BBox, Geometry, PolygonRings, Ring};
use core_geom::Feature;
use core_label::{pole_of_inaccessibility, CollisionDetector, CollisionRecord};
use core_pixel::{blend::blend_premultiplied, BlendMode, Color, PixelBuffer, PixelFormat, Rgba8};
use core_raster::{FillRule, Gamma, Rasterizer, Span};
use glam::Affine2;

use crate::building;
use core_style::{
    BuildingSymbolizer, DebugMode, DebugSymbolizer, GroupSymbolizer, ImagePatternSource,
    LinePatternSymbolizer, LineSymbolizer, MarkerSymbolizer, PatternSource, PlacementKind,
    PolygonPatternSymbolizer, PolygonSymbolizer, Symbolizer, TextSymbolizer, WrapMode,
};

/// Grid granularity for the pole-of-inaccessibility search (§4.G "Interior
/// placement"), in the geometry's own coordinate space. Not exposed as a
/// symbolizer property (spec.md §6's table has no such key); a fixed value
/// matches the module's own test tolerance (`core-label/src/placement.rs`).
const POLE_PRECISION: f64 = 1.0;

/// Everything a symbolizer needs beyond its own properties and the current
/// feature: the shared output buffer, the map's view transform, and the
/// stateful collaborators a single render pass owns (§5, §4.G).
pub struct RenderContext<'a> {
    pub target: &'a mut PixelBuffer<Rgba8>,
    pub view: Affine2,
    pub curve_tolerance: f64,
    pub collision: &'a mut CollisionDetector,
    pub fonts: &'a dyn FontEngine,
    /// The configured default gamma LUT (§4.D), applied to every fill this
    /// context produces. Individual symbolizers do not yet expose their own
    /// `gamma` property (absent from spec.md §6's table), so this is the
    /// one knob — sourced from `core-config` — until they do.
    pub gamma: Gamma,
}

fn rings_from_commands(commands: &[core_geom::vertex::Command]) -> Vec<Ring> {
    use core_geom::vertex::Command;
    let mut rings = Vec::new();
    let mut current: Ring = Vec::new();
    for cmd in commands {
        match *cmd {
            Command::MoveTo { x, y } => {
                if current.len() > 1 {
                    rings.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current.push((x, y));
            }
            Command::LineTo { x, y } | Command::Curve3 { x, y, .. } | Command::Curve4 { x, y, .. } => {
                current.push((x, y));
            }
            Command::Close | Command::End => {
                if current.len() > 1 {
                    rings.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > 1 {
        rings.push(current);
    }
    rings
}

fn rasterize_fill(commands: Vec<core_geom::vertex::Command>, rule: FillRule, gamma: Gamma) -> Vec<core_raster::Span> {
    let mut stream = to_stream(commands);
    let mut rasterizer = Rasterizer::new();
    rasterizer.add_stream(&mut stream);
    rasterizer.sweep(rule, gamma, None)
}

/// Blits AA spans of one solid color onto `target` through `mode` at
/// `opacity` (§4.D -> §4.A handoff every fill-producing symbolizer shares).
fn blit_solid(target: &mut PixelBuffer<Rgba8>, spans: &[core_raster::Span], color: Color, opacity: f64, mode: BlendMode) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || color.a == 0 {
        return;
    }
    for span in spans {
        if span.y < 0 || span.y as u32 >= target.height() {
            continue;
        }
        let y = span.y as u32;
        let x_start = span.x_start.max(0);
        let x_end = span.x_end.min(target.width() as i64);
        for x in x_start..x_end {
            let xu = x as u32;
            let alpha = (color.a as f64 / 255.0) * span.alpha * opacity;
            if alpha <= 0.0 {
                continue;
            }
            let straight = Color { r: color.r, g: color.g, b: color.b, a: (alpha * 255.0).round().clamp(0.0, 255.0) as u8, premultiplied: false };
            let premul = straight.premultiply();
            let src = Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a };
            let dst = target.get(xu, y).expect("x/y bounds checked above");
            let out = blend_premultiplied(mode, src.to_components_f32(), dst.to_components_f32());
            target.set(xu, y, Rgba8::from_components_f32(out));
        }
    }
}

pub fn render_polygon(sym: &PolygonSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    let chain = ConverterChain {
        feature_transform: Some(sym.common.transform.to_affine()),
        view_affine: Some(ctx.view),
        simplify_tolerance: sym.geometry.simplify_tolerance,
        smooth: sym.geometry.smooth,
        curve_tolerance: ctx.curve_tolerance,
        ..Default::default()
    };
    let mut stream = geometry.geometry().vertex_stream();
    let commands = run_polygon_chain(&mut stream, &chain);
    let fill = sym.fill.eval(feature);
    let fill_opacity = sym.fill_opacity.eval(feature) * sym.common.opacity;
    let spans = rasterize_fill(commands, FillRule::EvenOdd, ctx.gamma);
    blit_solid(ctx.target, &spans, fill, fill_opacity, sym.common.comp_op);
}

pub fn render_line(sym: &LineSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    let stroke_width = sym.stroke_width.eval(feature);
    let chain = ConverterChain {
        feature_transform: Some(sym.common.transform.to_affine()),
        view_affine: Some(ctx.view),
        simplify_tolerance: sym.geometry.simplify_tolerance,
        smooth: sym.geometry.smooth,
        curve_tolerance: ctx.curve_tolerance,
        offset_distance: sym.offset,
        dash_pattern: sym.dasharray.clone(),
        stroke_style: Some(StrokeStyle { width: stroke_width, cap: sym.line_cap, join: sym.line_join, miter_limit: sym.miter_limit }),
        ..Default::default()
    };
    let mut stream = geometry.geometry().vertex_stream();
    let commands = run_line_chain(&mut stream, &chain);
    let stroke = sym.stroke.eval(feature);
    let stroke_opacity = sym.stroke_opacity.eval(feature) * sym.common.opacity;
    let spans = rasterize_fill(commands, FillRule::NonZero, ctx.gamma);
    blit_solid(ctx.target, &spans, stroke, stroke_opacity, sym.common.comp_op);
}

pub fn render_building(sym: &BuildingSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    let chain = ConverterChain {
        feature_transform: Some(sym.common.transform.to_affine()),
        view_affine: Some(ctx.view),
        curve_tolerance: ctx.curve_tolerance,
        ..Default::default()
    };
    let mut stream = geometry.geometry().vertex_stream();
    let commands = run_polygon_chain(&mut stream, &chain);
    let rings = rings_from_commands(&commands);
    if rings.is_empty() {
        return;
    }

    let fill = sym.fill.eval(feature);
    let height = sym.height.eval(feature).abs();
    let opacity = sym.common.opacity;
    let wall_color = building::wall_shade(fill);

    // Exterior ring is the first extracted ring per polygon; holes (if any)
    // are ignored for wall extrusion (mapnik only extrudes the outer
    // boundary) but still contribute to the roof fill via non-zero winding.
    for ring in &rings {
        for face in building::wall_faces(ring, height) {
            let mut face_commands = Vec::new();
            face_commands.push(core_geom::vertex::Command::MoveTo { x: face.quad.exterior[0].0, y: face.quad.exterior[0].1 });
            for &(x, y) in &face.quad.exterior[1..] {
                face_commands.push(core_geom::vertex::Command::LineTo { x, y });
            }
            face_commands.push(core_geom::vertex::Command::Close);
            let spans = rasterize_fill(face_commands, FillRule::NonZero, ctx.gamma);
            blit_solid(ctx.target, &spans, wall_color, opacity, sym.common.comp_op);
        }
    }

    let mut roof_commands = Vec::new();
    for ring in &rings {
        let roof = building::roof_ring(ring, height);
        roof_commands.push(core_geom::vertex::Command::MoveTo { x: roof[0].0, y: roof[0].1 });
        for &(x, y) in &roof[1..] {
            roof_commands.push(core_geom::vertex::Command::LineTo { x, y });
        }
        roof_commands.push(core_geom::vertex::Command::Close);
    }
    let roof_spans = rasterize_fill(roof_commands, FillRule::NonZero, ctx.gamma);
    blit_solid(ctx.target, &roof_spans, fill, opacity, sym.common.comp_op);
}

/// Transforms a geometry-space bbox into screen space by projecting all
/// four corners and taking their envelope, matching how every collision
/// record's own bbox is already stored in screen space (§4.G, §4.H).
fn project_bbox(bbox: BBox, view: Affine2) -> BBox {
    let corners = [
        (bbox.min_x, bbox.min_y),
        (bbox.max_x, bbox.min_y),
        (bbox.min_x, bbox.max_y),
        (bbox.max_x, bbox.max_y),
    ];
    let mut out = BBox::empty();
    for (x, y) in corners {
        let p = view.transform_point2(glam::Vec2::new(x as f32, y as f32));
        out.extend(p.x as f64, p.y as f64);
    }
    out
}

/// A thin one-pixel-wide red frame around `bbox` (§4.H "Debug: draws
/// collision boxes"), clipped to `target`'s bounds.
fn draw_box_outline(target: &mut PixelBuffer<Rgba8>, bbox: BBox, color: Color) {
    let premul = color.premultiply();
    let src = Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a };
    let min_x = bbox.min_x.round() as i64;
    let max_x = bbox.max_x.round() as i64;
    let min_y = bbox.min_y.round() as i64;
    let max_y = bbox.max_y.round() as i64;
    let mut plot = |x: i64, y: i64| {
        if x >= 0 && y >= 0 && (x as u32) < target.width() && (y as u32) < target.height() {
            target.set(x as u32, y as u32, src);
        }
    };
    for x in min_x..=max_x {
        plot(x, min_y);
        plot(x, max_y);
    }
    for y in min_y..=max_y {
        plot(min_x, y);
        plot(max_x, y);
    }
}

pub fn render_debug(sym: &DebugSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    match sym.mode {
        DebugMode::Collision => {
            // Outline every collision box currently held by the detector
            // that intersects this feature's own bbox, as a thin red frame
            // (§4.H "Debug: draws collision boxes").
            let Some(geometry) = feature.geometry() else { return };
            let screen_bbox = project_bbox(geometry.bbox(), ctx.view);
            let boxes: Vec<BBox> = ctx.collision.records_intersecting(&screen_bbox).map(|r| r.bbox).collect();
            for bbox in boxes {
                draw_box_outline(ctx.target, bbox, Color::rgb(255, 0, 0));
            }
        }
        DebugMode::Vertex => {
            let Some(geometry) = feature.geometry() else { return };
            let mut stream = geometry.geometry().vertex_stream();
            let commands = core_geom::vertex::collect_all(&mut stream);
            for cmd in commands {
                if let Some((x, y)) = cmd.terminal() {
                    let p = ctx.view.transform_point2(glam::Vec2::new(x as f32, y as f32));
                    let (px, py) = (p.x.round() as i64, p.y.round() as i64);
                    if px >= 0 && py >= 0 && (px as u32) < ctx.target.width() && (py as u32) < ctx.target.height() {
                        let marker = Color::rgb(255, 0, 0).premultiply();
                        ctx.target.set(px as u32, py as u32, Rgba8 { r: marker.r, g: marker.g, b: marker.b, a: marker.a });
                    }
                }
            }
        }
    }
}

fn shape_and_measure(text: &str, fonts: &dyn FontEngine, faces: &FaceSet, size: f64) -> (Vec<Glyph>, f64) {
    let glyphs = fonts.shape(text, faces, size);
    let length = glyphs.iter().map(|g| g.advance).sum();
    (glyphs, length)
}

fn blit_glyphs(target: &mut PixelBuffer<Rgba8>, fonts: &dyn FontEngine, face: &Face, glyphs: &[Glyph], origin: (f64, f64), size: f64, fill: Color) {
    let mut pen_x = origin.0;
    let pen_y = origin.1;
    for glyph in glyphs {
        if let Some(bitmap) = fonts.bitmap(face, glyph.codepoint, size) {
            let base_x = (pen_x + glyph.bearing.0).round() as i64;
            let base_y = (pen_y + glyph.bearing.1).round() as i64;
            for row in 0..bitmap.rows {
                for col in 0..bitmap.width {
                    let coverage = bitmap.coverage(col, row);
                    if coverage == 0 {
                        continue;
                    }
                    let px = base_x + col as i64;
                    let py = base_y + row as i64;
                    if px < 0 || py < 0 || px as u32 >= target.width() || py as u32 >= target.height() {
                        continue;
                    }
                    let alpha = (fill.a as f64 / 255.0) * (coverage as f64 / 255.0);
                    let straight = Color { r: fill.r, g: fill.g, b: fill.b, a: (alpha * 255.0).round().clamp(0.0, 255.0) as u8, premultiplied: false };
                    let premul = straight.premultiply();
                    let src = Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a };
                    let dst = target.get(px as u32, py as u32).expect("bounds checked above");
                    let out = blend_premultiplied(BlendMode::SrcOver, src.to_components_f32(), dst.to_components_f32());
                    target.set(px as u32, py as u32, Rgba8::from_components_f32(out));
                }
            }
        }
        pen_x += glyph.advance;
    }
}

pub fn render_text(sym: &TextSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let text = sym.name.eval(feature);
    if text.trim().is_empty() {
        return;
    }
    let Some(geometry) = feature.geometry() else { return };
    let face = Face::new(sym.face_name.clone());
    let faces = FaceSet::single(face.clone());
    let (glyphs, label_length) = shape_and_measure(&text, ctx.fonts, &faces, sym.size);

    let candidates: Vec<((f64, f64), f64)> = match sym.placement {
        PlacementKind::Point => geometry
            .geometry()
            .representative_point()
            .into_iter()
            .map(|p| (p, 0.0))
            .collect(),
        // Pole-of-inaccessibility (§4.G "Interior placement"), distinct from
        // Point's signed-area centroid: it stays clear of holes and doesn't
        // drift outside a concave ring.
        PlacementKind::Interior => match geometry.geometry() {
            Geometry::Polygon(polygon) => vec![(pole_of_inaccessibility(polygon, POLE_PRECISION), 0.0)],
            Geometry::MultiPolygon(polys) => polys
                .first()
                .map(|p| vec![(pole_of_inaccessibility(p, POLE_PRECISION), 0.0)])
                .unwrap_or_default(),
            _ => geometry.geometry().representative_point().into_iter().map(|p| (p, 0.0)).collect(),
        },
        PlacementKind::Line => {
            let ring = match geometry.geometry() {
                Geometry::LineString(r) => Some(r.clone()),
                Geometry::MultiLineString(rs) => rs.first().cloned(),
                _ => None,
            };
            ring.map(|r| {
                core_label::line_placements(&r, label_length, sym.spacing, sym.max_error, sym.max_char_angle_delta)
                    .into_iter()
                    .map(|c| (c.position, c.angle))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
        }
        PlacementKind::Vertex => {
            let ring = match geometry.geometry() {
                Geometry::LineString(r) => Some(r.clone()),
                _ => None,
            };
            ring.map(|r| core_label::vertex_placements(&r).into_iter().map(|p| (p, 0.0)).collect::<Vec<_>>())
                .unwrap_or_default()
        }
    };

    for (geo_point, _angle) in candidates {
        let screen = ctx.view.transform_point2(glam::Vec2::new(geo_point.0 as f32, geo_point.1 as f32));
        let half_width = label_length / 2.0;
        let bbox = BBox {
            min_x: screen.x as f64 - half_width,
            min_y: screen.y as f64 - sym.size,
            max_x: screen.x as f64 + half_width,
            max_y: screen.y as f64,
        };
        if !sym.allow_overlap && !ctx.collision.has_placement(&bbox, None, sym.min_distance) {
            continue;
        }
        if let Some(halo) = sym.halo_fill {
            // Approximate the halo as a solid backdrop behind the glyph run
            // rather than a true per-glyph stroke (the converter-chain
            // stroke machinery expects vector paths, not glyph bitmaps).
            let mut halo_commands = Vec::new();
            let pad = sym.halo_radius;
            halo_commands.push(core_geom::vertex::Command::MoveTo { x: bbox.min_x - pad, y: bbox.min_y - pad });
            halo_commands.push(core_geom::vertex::Command::LineTo { x: bbox.max_x + pad, y: bbox.min_y - pad });
            halo_commands.push(core_geom::vertex::Command::LineTo { x: bbox.max_x + pad, y: bbox.max_y + pad });
            halo_commands.push(core_geom::vertex::Command::LineTo { x: bbox.min_x - pad, y: bbox.max_y + pad });
            halo_commands.push(core_geom::vertex::Command::Close);
            let spans = rasterize_fill(halo_commands, FillRule::NonZero, ctx.gamma);
            blit_solid(ctx.target, &spans, halo, sym.common.opacity, sym.common.comp_op);
        }
        blit_glyphs(ctx.target, ctx.fonts, &face, &glyphs, (bbox.min_x, bbox.max_y), sym.size, sym.fill);
        if !sym.ignore_placement {
            let mut record = CollisionRecord::new(bbox);
            if sym.min_distance > 0.0 {
                record = record.with_key(text.clone(), sym.min_distance);
            }
            ctx.collision.insert(record);
        }
    }
}

/// A built-in placeholder vector marker (a unit circle approximated by an
/// octagon) used when a `MarkerSymbolizer` carries no `file` (§7
/// `MissingAsset` policy, in-scope half: no asset to fail to load).
fn placeholder_marker(width: f64, height: f64) -> core_marker::VectorMarker {
    use core_geom::vertex::Command;
    let rx = width / 2.0;
    let ry = height / 2.0;
    const SIDES: usize = 8;
    let mut path = Vec::with_capacity(SIDES + 2);
    for i in 0..=SIDES {
        let t = (i as f64 / SIDES as f64) * std::f64::consts::TAU;
        let (x, y) = (rx * t.cos(), ry * t.sin());
        if i == 0 {
            path.push(Command::MoveTo { x, y });
        } else {
            path.push(Command::LineTo { x, y });
        }
    }
    path.push(Command::Close);
    core_marker::VectorMarker {
        groups: vec![core_marker::MarkerAttributeGroup { path, ..Default::default() }],
        bbox: (-rx, -ry, rx, ry),
    }
}

pub fn render_marker(sym: &MarkerSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    if sym.file.is_some() {
        // Loading an external marker asset is the out-of-scope "file
        // format parsing" collaborator (§1); a real dispatcher would ask a
        // marker cache/loader for it.
        tracing::warn!(target: "marker", file = ?sym.file, "external marker asset loading is not implemented, skipping feature");
        return;
    }
    let Some(point) = geometry.geometry().representative_point() else { return };
    let fill = sym.fill.eval(feature);
    let stroke = sym.stroke.eval(feature);
    let mut marker = placeholder_marker(sym.width, sym.height);
    marker.groups[0].fill = Some(core_marker::Paint::Solid(fill));
    marker.groups[0].fill_opacity = sym.fill_opacity.eval(feature);
    marker.groups[0].stroke = Some(core_marker::Paint::Solid(stroke));
    marker.groups[0].stroke_width = sym.stroke_width.eval(feature);

    let screen = ctx.view.transform_point2(glam::Vec2::new(point.0 as f32, point.1 as f32));
    let bbox = BBox {
        min_x: screen.x as f64 - sym.width / 2.0,
        min_y: screen.y as f64 - sym.height / 2.0,
        max_x: screen.x as f64 + sym.width / 2.0,
        max_y: screen.y as f64 + sym.height / 2.0,
    };
    if !sym.allow_overlap && !ctx.collision.has_placement(&bbox, None, 0.0) {
        return;
    }
    let placement = core_marker::Placement::at((screen.x as f64, screen.y as f64));
    core_marker::render_vector_marker(
        &marker,
        &placement,
        sym.common.transform.to_affine(),
        1.0,
        sym.common.opacity,
        ctx.curve_tolerance,
        sym.common.comp_op,
        ctx.target,
    );
    if !sym.ignore_placement {
        ctx.collision.insert(CollisionRecord::new(bbox));
    }
}

pub fn render_group(sym: &GroupSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    for child in &sym.children {
        dispatch(child, feature, ctx);
    }
}

/// A built-in placeholder pattern (a four-pixel checker) standing in for an
/// external pattern image — decoding the file named by a pattern
/// symbolizer is the out-of-scope half (§1); stepping a `PatternSource`
/// across a fill or along a line is not, so that part still runs (§7
/// `MissingAsset` policy, mirrors `placeholder_marker`).
fn placeholder_pattern() -> ImagePatternSource {
    const SIZE: u32 = 8;
    let mut img: PixelBuffer<Rgba8> = PixelBuffer::new(SIZE, SIZE);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let on = ((x / 4) + (y / 4)) % 2 == 0;
            let color = if on { Color::rgba(120, 120, 120, 255) } else { Color::TRANSPARENT };
            let premul = color.premultiply();
            img.set(x, y, Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a });
        }
    }
    ImagePatternSource::new(img)
}

/// The smallest coordinate among `commands`' terminal points — the "feature
/// origin" the polygon-pattern span generator offsets its sampling from
/// (§4.H).
fn commands_origin(commands: &[core_geom::vertex::Command]) -> (f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    for cmd in commands {
        if let Some((x, y)) = cmd.terminal() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
        }
    }
    if min_x.is_finite() && min_y.is_finite() {
        (min_x, min_y)
    } else {
        (0.0, 0.0)
    }
}

/// Samples `pattern` once per pixel of `spans` through `pattern_coord`
/// (mapping a screen pixel to pattern space), instead of `blit_solid`'s
/// single fixed color — the span generator both pattern symbolizers share
/// (§4.H).
fn blit_pattern(
    target: &mut PixelBuffer<Rgba8>,
    spans: &[Span],
    pattern: &dyn PatternSource,
    wrap: WrapMode,
    opacity: f64,
    mode: BlendMode,
    mut pattern_coord: impl FnMut(i64, i64) -> (f64, f64),
) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    for span in spans {
        if span.y < 0 || span.y as u32 >= target.height() {
            continue;
        }
        let y = span.y as u32;
        let x_start = span.x_start.max(0);
        let x_end = span.x_end.min(target.width() as i64);
        for x in x_start..x_end {
            let xu = x as u32;
            let (u, v) = pattern_coord(x, span.y);
            let sample = pattern.sample(u.round() as i64, v.round() as i64, wrap);
            if sample.a == 0 {
                continue;
            }
            let sample_alpha = sample.a as f64 / 255.0;
            let alpha = sample_alpha * span.alpha * opacity;
            if alpha <= 0.0 {
                continue;
            }
            let scale = alpha / sample_alpha;
            let src = Rgba8 {
                r: (sample.r as f64 * scale).round().clamp(0.0, 255.0) as u8,
                g: (sample.g as f64 * scale).round().clamp(0.0, 255.0) as u8,
                b: (sample.b as f64 * scale).round().clamp(0.0, 255.0) as u8,
                a: (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
            };
            let dst = target.get(xu, y).expect("x/y bounds checked above");
            let out = blend_premultiplied(mode, src.to_components_f32(), dst.to_components_f32());
            target.set(xu, y, Rgba8::from_components_f32(out));
        }
    }
}

pub fn render_polygon_pattern(sym: &PolygonPatternSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    let chain = ConverterChain {
        feature_transform: Some(sym.common.transform.to_affine()),
        view_affine: Some(ctx.view),
        simplify_tolerance: sym.geometry.simplify_tolerance,
        smooth: sym.geometry.smooth,
        curve_tolerance: ctx.curve_tolerance,
        ..Default::default()
    };
    let mut stream = geometry.geometry().vertex_stream();
    let commands = run_polygon_chain(&mut stream, &chain);
    let (origin_x, origin_y) = commands_origin(&commands);
    let spans = rasterize_fill(commands, FillRule::EvenOdd, ctx.gamma);

    // External pattern-image decoding is the out-of-scope half (§1); the
    // span generator itself still runs against a placeholder pattern rather
    // than skipping the feature (`sym.file` is never populated by anything
    // in this workspace, so this fallback is unconditional).
    tracing::debug!(target: "pattern", file = %sym.file, "pattern asset loading is not implemented, stepping a placeholder pattern");
    let pattern = placeholder_pattern();
    blit_pattern(ctx.target, &spans, &pattern, sym.wrap, sym.common.opacity, sym.common.comp_op, |x, y| {
        (x as f64 - origin_x, y as f64 - origin_y)
    });
}

/// Nearest point on any polyline in `lines` to `(px, py)`: that polyline's
/// own arc length at the nearest point, and the signed perpendicular offset
/// from it (positive to the left of travel direction) — the line-pattern
/// outline renderer's "stepping along arc length" (§4.H).
fn nearest_on_polylines(lines: &[Ring], px: f64, py: f64) -> (f64, f64) {
    let mut best_dist_sq = f64::INFINITY;
    let mut best = (0.0, 0.0);
    for line in lines {
        let mut arc = 0.0;
        for w in line.windows(2) {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            let dx = x1 - x0;
            let dy = y1 - y0;
            let seg_len_sq = dx * dx + dy * dy;
            let seg_len = seg_len_sq.sqrt();
            if seg_len > 1e-9 {
                let t = (((px - x0) * dx + (py - y0) * dy) / seg_len_sq).clamp(0.0, 1.0);
                let cx = x0 + dx * t;
                let cy = y0 + dy * t;
                let dist_sq = (px - cx).powi(2) + (py - cy).powi(2);
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    let cross = dx * (py - y0) - dy * (px - x0);
                    best = (arc + seg_len * t, cross / seg_len);
                }
            }
            arc += seg_len;
        }
    }
    best
}

pub fn render_line_pattern(sym: &LinePatternSymbolizer, feature: &Feature, ctx: &mut RenderContext) {
    let Some(geometry) = feature.geometry() else { return };
    let base_chain = ConverterChain {
        feature_transform: Some(sym.common.transform.to_affine()),
        view_affine: Some(ctx.view),
        simplify_tolerance: sym.geometry.simplify_tolerance,
        smooth: sym.geometry.smooth,
        curve_tolerance: ctx.curve_tolerance,
        ..Default::default()
    };
    let mut stream = geometry.geometry().vertex_stream();
    let centerlines = rings_from_commands(&run_line_chain(&mut stream, &base_chain));
    if centerlines.is_empty() {
        return;
    }

    tracing::debug!(target: "pattern", file = %sym.file, "pattern asset loading is not implemented, stepping a placeholder pattern");
    let pattern = placeholder_pattern();
    let pattern_height = pattern.height().max(1) as f64;

    // A second pass through the chain, this time stroked into a ribbon the
    // width of the pattern tile — the fillable shape the pattern is stepped
    // across; the unstroked `centerlines` above stay the arc-length
    // reference.
    let ribbon_chain = ConverterChain {
        stroke_style: Some(StrokeStyle { width: pattern_height, cap: LineCap::Butt, join: LineJoin::Miter, miter_limit: 4.0 }),
        ..base_chain
    };
    let mut stream = geometry.geometry().vertex_stream();
    let ribbon_commands = run_line_chain(&mut stream, &ribbon_chain);
    let spans = rasterize_fill(ribbon_commands, FillRule::NonZero, ctx.gamma);

    blit_pattern(ctx.target, &spans, &pattern, sym.wrap, sym.common.opacity, sym.common.comp_op, |x, y| {
        let (arc, signed_offset) = nearest_on_polylines(&centerlines, x as f64, y as f64);
        (arc, signed_offset + pattern_height / 2.0)
    });
}

/// The §4.H dispatch table: one arm per symbolizer variant. `Point` and
/// `Shield` terminate in loading a file-based asset, which is the external
/// "file format parsing" collaborator spec.md §1 excludes — they log and
/// skip (or, for `Shield`, fall back to its text) rather than fabricate
/// image decoding. `PolygonPattern`/`LinePattern` only need a pattern's
/// pixels, not its file, so they still render through a placeholder.
pub fn dispatch(symbolizer: &Symbolizer, feature: &Feature, ctx: &mut RenderContext) {
    match symbolizer {
        Symbolizer::Polygon(sym) => render_polygon(sym, feature, ctx),
        Symbolizer::Line(sym) => render_line(sym, feature, ctx),
        Symbolizer::PolygonPattern(sym) => render_polygon_pattern(sym, feature, ctx),
        Symbolizer::LinePattern(sym) => render_line_pattern(sym, feature, ctx),
        Symbolizer::Point(sym) => {
            tracing::warn!(target: "point", file = %sym.file, "point image loading is not implemented, skipping feature");
        }
        Symbolizer::Marker(sym) => render_marker(sym, feature, ctx),
        Symbolizer::Raster(_) => {
            // Dispatched separately by the processor via raster_path, since
            // it operates on `Feature::raster()` rather than `geometry()`.
        }
        Symbolizer::Text(sym) => render_text(sym, feature, ctx),
        Symbolizer::Shield(sym) => {
            tracing::warn!(target: "shield", file = %sym.file, "shield image loading is not implemented, falling back to text only");
            render_text(&sym.text, feature, ctx);
        }
        Symbolizer::Building(sym) => render_building(sym, feature, ctx),
        Symbolizer::Debug(sym) => render_debug(sym, feature, ctx),
        Symbolizer::Group(sym) => render_group(sym, feature, ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_font::StubFontEngine;
    use core_geom::geometry::PolygonRings;
    use core_style::{CommonProps, GeometryProps, Property};

    #[test]
    fn polygon_symbolizer_paints_its_fill_color() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(100, 100);
        let mut collision = CollisionDetector::new();
        let fonts = StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let sym = PolygonSymbolizer {
            common: CommonProps::default(),
            geometry: GeometryProps::default(),
            fill: Property::literal(Color::rgb(200, 0, 0)),
            fill_opacity: Property::literal(1.0),
        };
        let feature = Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
            exterior: vec![(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)],
            holes: vec![],
        }));
        render_polygon(&sym, &feature, &mut ctx);
        let center = target.get(50, 50).unwrap();
        assert!(center.r > 0);
    }

    #[test]
    fn building_symbolizer_with_zero_height_only_paints_the_roof() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(100, 100);
        let mut collision = CollisionDetector::new();
        let fonts = StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let sym = BuildingSymbolizer {
            common: CommonProps::default(),
            fill: Property::literal(Color::rgb(100, 100, 100)),
            height: Property::literal(0.0),
        };
        let feature = Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
            exterior: vec![(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)],
            holes: vec![],
        }));
        render_building(&sym, &feature, &mut ctx);
        assert!(target.get(50, 50).unwrap().a > 0);
    }

    #[test]
    fn marker_without_a_file_renders_the_placeholder() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(100, 100);
        let mut collision = CollisionDetector::new();
        let fonts = StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let sym = MarkerSymbolizer { width: 20.0, height: 20.0, ..Default::default() };
        let feature = Feature::new(1).with_geometry(Geometry::Point(50.0, 50.0));
        render_marker(&sym, &feature, &mut ctx);
        assert_eq!(ctx.collision.len(), 1);
    }

    #[test]
    fn interior_placement_uses_pole_of_inaccessibility_not_the_centroid() {
        // An L-shaped (non-convex) ring whose signed-area centroid falls
        // outside the shape entirely; pole-of-inaccessibility must not.
        let ring = vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 2.0),
            (2.0, 2.0),
            (2.0, 10.0),
            (0.0, 10.0),
        ];
        let polygon = PolygonRings { exterior: ring, holes: vec![] };
        let point = pole_of_inaccessibility(&polygon, POLE_PRECISION);
        let centroid = Geometry::Polygon(polygon).representative_point().unwrap();
        assert_ne!(point, centroid);
    }

    #[test]
    fn polygon_pattern_symbolizer_paints_pixels_without_a_real_file() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(100, 100);
        let mut collision = CollisionDetector::new();
        let fonts = StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let sym = PolygonPatternSymbolizer {
            common: CommonProps::default(),
            geometry: GeometryProps::default(),
            file: String::new(),
            wrap: WrapMode::Repeat,
        };
        let feature = Feature::new(1).with_geometry(Geometry::Polygon(PolygonRings {
            exterior: vec![(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)],
            holes: vec![],
        }));
        render_polygon_pattern(&sym, &feature, &mut ctx);
        let painted = (0..100).flat_map(|y| (0..100).map(move |x| (x, y))).any(|(x, y)| target.get(x, y).unwrap().a > 0);
        assert!(painted);
    }

    #[test]
    fn line_pattern_symbolizer_paints_pixels_along_the_centerline() {
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(100, 100);
        let mut collision = CollisionDetector::new();
        let fonts = StubFontEngine;
        let mut ctx = RenderContext {
            target: &mut target,
            view: core_convert::view_affine(0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 1.0),
            curve_tolerance: 0.25,
            collision: &mut collision,
            fonts: &fonts,
            gamma: core_raster::Gamma::default(),
        };
        let sym = LinePatternSymbolizer {
            common: CommonProps::default(),
            geometry: GeometryProps::default(),
            file: String::new(),
            wrap: WrapMode::Repeat,
        };
        let feature = Feature::new(1).with_geometry(Geometry::LineString(vec![(10.0, 50.0), (90.0, 50.0)]));
        render_line_pattern(&sym, &feature, &mut ctx);
        let painted = (0..100).flat_map(|y| (0..100).map(move |x| (x, y))).any(|(x, y)| target.get(x, y).unwrap().a > 0);
        assert!(painted);
    }
}
