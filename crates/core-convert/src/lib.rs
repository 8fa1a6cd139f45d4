//! Vertex converter chain (§4.C): the fixed sequence of stream-to-stream
//! transformers between a geometry's native coordinates and the
//! rasterizer — clip, geometry/view transform, simplify, smooth, offset,
//! dash, stroke — plus the curve flattener that sits between smoothing and
//! everything downstream of it.
//!
//! Each converter here is a pure function over a materialized
//! `Vec<Command>` rather than a single-pass pull-based transducer like the
//! C++ ancestor's `agg::conv_*` classes. That trades 4.C's claimed O(1)
//! buffering for O(subpath) buffering per stage — acceptable at the vertex
//! counts a single map tile's features carry, and considerably simpler to
//! get right without a running interpreter to check it against.

pub mod clip;
pub mod dash;
pub mod flatten;
pub mod offset;
pub mod simplify;
pub mod smooth;
pub mod stroke;
mod subpath;
pub mod transform;

pub use clip::ClipRect;
pub use dash::DashPattern;
pub use smooth::SmoothAlgorithm;
pub use stroke::{LineCap, LineJoin, StrokeStyle};

use core_geom::vertex::{Command, VecStream, VertexStream};

/// The subset of 4.C stage toggles a symbolizer actually exposes; `None`
/// skips that stage entirely rather than running it as a no-op, matching
/// the optional (`?`) stages in the 4.H dispatch table.
#[derive(Debug, Clone, Default)]
pub struct ConverterChain {
    pub clip_rect: Option<ClipRect>,
    pub feature_transform: Option<glam::Affine2>,
    pub view_affine: Option<glam::Affine2>,
    pub simplify_tolerance: Option<f64>,
    pub smooth: Option<(SmoothAlgorithm, f64)>,
    pub curve_tolerance: f64,
    pub offset_distance: Option<f64>,
    pub dash_pattern: Option<DashPattern>,
    pub stroke_style: Option<StrokeStyle>,
}

/// Runs a polygon ring through the chain's non-stroke stages (1-5),
/// matching the 4.H "Polygon" converter chain: `clip? . transform . affine
/// . simplify? . smooth?`.
pub fn run_polygon_chain<S: VertexStream + ?Sized>(source: &mut S, chain: &ConverterChain) -> Vec<Command> {
    let mut commands = core_geom::vertex::collect_all(source);
    if let Some(rect) = &chain.clip_rect {
        commands = clip::clip_polygon(&commands, rect);
    }
    commands = apply_transforms(&commands, chain);
    if let Some(tolerance) = chain.simplify_tolerance {
        commands = simplify::simplify(&commands, tolerance);
    }
    if let Some((algo, value)) = chain.smooth {
        if value > 0.0 {
            commands = smooth::smooth(&commands, algo, value);
            commands = flatten::flatten(&commands, chain.curve_tolerance);
        }
    }
    commands
}

/// Runs a line through the full 4.H "Line" chain: `clip? . transform .
/// affine . simplify? . smooth? . offset? . dash? . stroke`.
pub fn run_line_chain<S: VertexStream + ?Sized>(source: &mut S, chain: &ConverterChain) -> Vec<Command> {
    let mut commands = core_geom::vertex::collect_all(source);
    if let Some(rect) = &chain.clip_rect {
        commands = clip::clip_lines(&commands, rect);
    }
    commands = apply_transforms(&commands, chain);
    if let Some(tolerance) = chain.simplify_tolerance {
        commands = simplify::simplify(&commands, tolerance);
    }
    if let Some((algo, value)) = chain.smooth {
        if value > 0.0 {
            commands = smooth::smooth(&commands, algo, value);
            commands = flatten::flatten(&commands, chain.curve_tolerance);
        }
    }
    if let Some(distance) = chain.offset_distance {
        commands = offset::offset(&commands, distance);
    }
    if let Some(pattern) = &chain.dash_pattern {
        commands = dash::dash(&commands, pattern);
    }
    if let Some(style) = &chain.stroke_style {
        commands = stroke::stroke(&commands, style);
    }
    commands
}

fn apply_transforms(commands: &[Command], chain: &ConverterChain) -> Vec<Command> {
    let mut commands = commands.to_vec();
    if let Some(m) = &chain.feature_transform {
        commands = transform::apply_affine(&commands, m);
    }
    if let Some(m) = &chain.view_affine {
        commands = transform::apply_affine(&commands, m);
    }
    commands
}

/// Wraps a finished `Vec<Command>` back into the `VertexStream` contract the
/// rasterizer (core-raster) consumes.
pub fn to_stream(mut commands: Vec<Command>) -> VecStream {
    if commands.last() != Some(&Command::End) {
        commands.push(Command::End);
    }
    VecStream::new(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::geometry::{Geometry, PolygonRings};

    #[test]
    fn polygon_chain_with_no_optional_stages_is_a_passthrough() {
        let geom = Geometry::Polygon(PolygonRings {
            exterior: vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            holes: vec![],
        });
        let mut stream = geom.vertex_stream();
        let chain = ConverterChain::default();
        let out = run_polygon_chain(&mut stream, &chain);
        assert_eq!(out.iter().filter(|c| c.is_move()).count(), 1);
    }

    #[test]
    fn line_chain_with_stroke_yields_a_fillable_polygon() {
        let geom = Geometry::LineString(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let mut stream = geom.vertex_stream();
        let chain = ConverterChain {
            stroke_style: Some(StrokeStyle { width: 2.0, ..Default::default() }),
            curve_tolerance: 0.25,
            ..Default::default()
        };
        let out = run_line_chain(&mut stream, &chain);
        assert!(out.iter().any(|c| *c == Command::Close));
    }
}
