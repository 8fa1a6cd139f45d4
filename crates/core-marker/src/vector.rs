//! Vector (SVG-path-tree) marker rendering (§4.F steps 1-4).

use core_convert::stroke::StrokeStyle;
use core_convert::{dash, flatten, stroke};
use core_geom::vertex::Command;
use core_pixel::blend::blend_premultiplied;
use core_pixel::{BlendMode, Color, PixelBuffer, PixelFormat, Rgba8};
use core_raster::{FillRule, Gamma, Rasterizer};
use glam::{Affine2, Vec2};

use crate::gradient::Gradient;

/// How a placement paints a path: a flat color, or a gradient sampled per
/// pixel through its LUT.
#[derive(Debug, Clone)]
pub enum Paint {
    Solid(Color),
    Gradient(Gradient, crate::gradient::GradientLut),
}

impl Paint {
    pub fn gradient(gradient: Gradient) -> Self {
        let lut = crate::gradient::GradientLut::build(&gradient.stops);
        Paint::Gradient(gradient, lut)
    }

    fn color_at(&self, point: (f64, f64), bbox: (f64, f64, f64, f64)) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Gradient(g, lut) => lut.sample(g.offset_at(point, bbox)),
        }
    }
}

/// One attribute-group node of a vector marker's path tree: its own path
/// (may still carry `Curve3`/`Curve4`), local transform, and fill/stroke
/// paint (§4.F steps 3-4).
#[derive(Debug, Clone)]
pub struct MarkerAttributeGroup {
    pub path: Vec<Command>,
    pub transform: Affine2,
    pub visible: bool,
    pub fill: Option<Paint>,
    pub fill_opacity: f64,
    pub stroke: Option<Paint>,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub dasharray: Option<dash::DashPattern>,
    pub line_cap: stroke::LineCap,
    pub line_join: stroke::LineJoin,
    pub miter_limit: f64,
}

impl Default for MarkerAttributeGroup {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            transform: Affine2::IDENTITY,
            visible: true,
            fill: None,
            fill_opacity: 1.0,
            stroke: None,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            dasharray: None,
            line_cap: stroke::LineCap::Butt,
            line_join: stroke::LineJoin::Miter,
            miter_limit: 4.0,
        }
    }
}

/// A complete vector marker: its path tree plus the natural bounding box
/// used for centering on a placement point and for `ObjectBoundingBox`
/// gradients.
#[derive(Debug, Clone)]
pub struct VectorMarker {
    pub groups: Vec<MarkerAttributeGroup>,
    pub bbox: (f64, f64, f64, f64),
}

/// Where and how a marker is placed: the target point, a rotation (radians,
/// typically the tangent of a line placement), and an optional explicit
/// anchor overriding the default bbox-center behavior (§4.F step 1).
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub position: (f64, f64),
    pub rotation: f64,
    pub anchor_override: Option<(f64, f64)>,
}

impl Placement {
    pub fn at(position: (f64, f64)) -> Self {
        Self { position, rotation: 0.0, anchor_override: None }
    }
}

fn bbox_center(bbox: (f64, f64, f64, f64)) -> (f64, f64) {
    ((bbox.0 + bbox.2) / 2.0, (bbox.1 + bbox.3) / 2.0)
}

fn path_bbox(commands: &[Command]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for cmd in commands {
        if let Some((x, y)) = cmd.terminal() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x > max_x {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        (min_x, min_y, max_x, max_y)
    }
}

fn to_stream(mut commands: Vec<Command>) -> core_geom::vertex::VecStream {
    if commands.last() != Some(&Command::End) {
        commands.push(Command::End);
    }
    core_geom::vertex::VecStream::new(commands)
}

fn rasterize(commands: Vec<Command>, rule: FillRule) -> Vec<core_raster::Span> {
    let mut stream = to_stream(commands);
    let mut rasterizer = Rasterizer::new();
    rasterizer.add_stream(&mut stream);
    rasterizer.sweep(rule, Gamma::default(), None)
}

fn blit_spans(target: &mut PixelBuffer<Rgba8>, spans: &[core_raster::Span], paint: &Paint, bbox: (f64, f64, f64, f64), opacity: f64, mode: BlendMode) {
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
            let base = paint.color_at((x as f64 + 0.5, y as f64 + 0.5), bbox);
            let alpha = (base.a as f64 / 255.0) * span.alpha * opacity;
            if alpha <= 0.0 {
                continue;
            }
            let straight = Color {
                r: base.r,
                g: base.g,
                b: base.b,
                a: (alpha * 255.0).round().clamp(0.0, 255.0) as u8,
                premultiplied: false,
            };
            let premul = straight.premultiply();
            let src_px = Rgba8 { r: premul.r, g: premul.g, b: premul.b, a: premul.a };
            let dst_px = target.get(xu, y).expect("x/y bounds checked above");
            let out = blend_premultiplied(mode, src_px.to_components_f32(), dst_px.to_components_f32());
            target.set(xu, y, Rgba8::from_components_f32(out));
        }
    }
}

/// Renders a vector marker onto `target` at `placement` (§4.F).
///
/// `marker_transform` is the per-feature `transform` expression's affine
/// (step 2's first factor); `scale_factor` is the map's device scale
/// (step 2's second factor); `placement.rotation`/`placement.position`
/// supply the third.
#[allow(clippy::too_many_arguments)]
pub fn render_vector_marker(
    marker: &VectorMarker,
    placement: &Placement,
    marker_transform: Affine2,
    scale_factor: f64,
    opacity: f64,
    curve_tolerance: f64,
    comp_op: BlendMode,
    target: &mut PixelBuffer<Rgba8>,
) {
    let anchor = placement.anchor_override.unwrap_or_else(|| bbox_center(marker.bbox));
    let to_origin = Affine2::from_translation(Vec2::new(-anchor.0 as f32, -anchor.1 as f32));
    let scaled = Affine2::from_scale(Vec2::splat(scale_factor as f32)) * marker_transform;
    let place = Affine2::from_angle_translation(
        placement.rotation as f32,
        Vec2::new(placement.position.0 as f32, placement.position.1 as f32),
    );
    let total = place * scaled * to_origin;

    for group in &marker.groups {
        if !group.visible {
            continue;
        }
        let group_transform = total * group.transform;
        let transformed = core_convert::transform::apply_affine(&group.path, &group_transform);
        let flattened = flatten::flatten(&transformed, curve_tolerance);
        let bbox = path_bbox(&flattened);

        if let Some(fill) = &group.fill {
            let spans = rasterize(flattened.clone(), FillRule::EvenOdd);
            blit_spans(target, &spans, fill, bbox, group.fill_opacity * opacity, comp_op);
        }

        if let Some(stroke_paint) = &group.stroke {
            let mut stroke_input = flattened.clone();
            if let Some(pattern) = &group.dasharray {
                stroke_input = dash::dash(&stroke_input, pattern);
            }
            let style = StrokeStyle {
                width: group.stroke_width,
                cap: group.line_cap,
                join: group.line_join,
                miter_limit: group.miter_limit,
            };
            let stroked = stroke::stroke(&stroke_input, &style);
            let spans = rasterize(stroked.clone(), FillRule::NonZero);
            let stroke_bbox = path_bbox(&stroked);
            blit_spans(target, &spans, stroke_paint, stroke_bbox, group.stroke_opacity * opacity, comp_op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_group(fill: Color) -> MarkerAttributeGroup {
        MarkerAttributeGroup {
            path: vec![
                Command::MoveTo { x: -5.0, y: -5.0 },
                Command::LineTo { x: 5.0, y: -5.0 },
                Command::LineTo { x: 5.0, y: 5.0 },
                Command::LineTo { x: -5.0, y: 5.0 },
                Command::Close,
                Command::End,
            ],
            fill: Some(Paint::Solid(fill)),
            ..Default::default()
        }
    }

    #[test]
    fn solid_fill_marker_paints_its_square_at_the_placement_point() {
        let marker = VectorMarker { groups: vec![square_group(Color::rgb(255, 0, 0))], bbox: (-5.0, -5.0, 5.0, 5.0) };
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(20, 20);
        target.fill(Color::rgb(255, 255, 255).premultiply());
        render_vector_marker(
            &marker,
            &Placement::at((10.0, 10.0)),
            Affine2::IDENTITY,
            1.0,
            1.0,
            0.25,
            BlendMode::SrcOver,
            &mut target,
        );
        let center = target.get(10, 10).unwrap();
        assert_eq!(center, Rgba8 { r: 255, g: 0, b: 0, a: 255 });
        let corner = target.get(0, 0).unwrap();
        assert_eq!(corner, Rgba8 { r: 255, g: 255, b: 255, a: 255 });
    }

    #[test]
    fn invisible_group_is_skipped() {
        let mut group = square_group(Color::rgb(0, 255, 0));
        group.visible = false;
        let marker = VectorMarker { groups: vec![group], bbox: (-5.0, -5.0, 5.0, 5.0) };
        let mut target: PixelBuffer<Rgba8> = PixelBuffer::new(20, 20);
        target.fill(Color::rgb(255, 255, 255).premultiply());
        render_vector_marker(
            &marker,
            &Placement::at((10.0, 10.0)),
            Affine2::IDENTITY,
            1.0,
            1.0,
            0.25,
            BlendMode::SrcOver,
            &mut target,
        );
        assert_eq!(target.get(10, 10).unwrap(), Rgba8 { r: 255, g: 255, b: 255, a: 255 });
    }
}
