//! Gradient stop lists and the 1024-entry sample LUT (§4.F "Gradient
//! sampling").

use core_pixel::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientGeometry {
    Linear { x1: f64, y1: f64, x2: f64, y2: f64 },
    Radial { cx: f64, cy: f64, r: f64 },
}

/// Whether gradient geometry coordinates are in the marker's own coordinate
/// space (`UserSpaceOnUse`) or normalized to the filled path's bounding box
/// (`ObjectBoundingBox`), mirroring SVG's `gradientUnits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientUnits {
    UserSpace,
    ObjectBoundingBox,
}

#[derive(Debug, Clone)]
pub struct Gradient {
    pub stops: Vec<GradientStop>,
    pub geometry: GradientGeometry,
    pub units: GradientUnits,
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let lerp_channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round().clamp(0.0, 255.0) as u8;
    Color {
        r: lerp_channel(a.r, b.r),
        g: lerp_channel(a.g, b.g),
        b: lerp_channel(a.b, b.b),
        a: lerp_channel(a.a, b.a),
        premultiplied: false,
    }
}

fn sample_stops(sorted_stops: &[GradientStop], t: f64) -> Color {
    match sorted_stops {
        [] => Color::TRANSPARENT,
        [only] => only.color,
        stops => {
            if t <= stops[0].offset {
                return stops[0].color;
            }
            let last = stops[stops.len() - 1];
            if t >= last.offset {
                return last.color;
            }
            for pair in stops.windows(2) {
                if t >= pair[0].offset && t <= pair[1].offset {
                    let span = (pair[1].offset - pair[0].offset).max(1e-9);
                    let local = (t - pair[0].offset) / span;
                    return lerp_color(pair[0].color, pair[1].color, local);
                }
            }
            last.color
        }
    }
}

/// A 1024-entry color lookup table built once from a gradient's stops
/// (§4.F: "A 1024-entry color LUT is built from the gradient stops").
#[derive(Debug, Clone)]
pub struct GradientLut {
    entries: Vec<Color>,
}

impl GradientLut {
    pub const SIZE: usize = 1024;

    pub fn build(stops: &[GradientStop]) -> Self {
        let mut sorted = stops.to_vec();
        sorted.sort_by(|a, b| a.offset.partial_cmp(&b.offset).unwrap_or(std::cmp::Ordering::Equal));
        let entries = (0..Self::SIZE)
            .map(|i| sample_stops(&sorted, i as f64 / (Self::SIZE - 1) as f64))
            .collect();
        Self { entries }
    }

    /// Looks up the color at `offset` (clamped to `[0, 1]`).
    pub fn sample(&self, offset: f64) -> Color {
        if self.entries.is_empty() {
            return Color::TRANSPARENT;
        }
        let idx = (offset.clamp(0.0, 1.0) * (Self::SIZE - 1) as f64).round() as usize;
        self.entries[idx.min(self.entries.len() - 1)]
    }
}

impl Gradient {
    /// The linear-interpolation offset for `point`, derived from this
    /// gradient's geometry and, for `ObjectBoundingBox` units, normalized
    /// against `bbox` first.
    pub fn offset_at(&self, point: (f64, f64), bbox: (f64, f64, f64, f64)) -> f64 {
        let (bx0, by0, bx1, by1) = bbox;
        let (w, h) = ((bx1 - bx0).max(1e-9), (by1 - by0).max(1e-9));
        let local_point = match self.units {
            GradientUnits::UserSpace => point,
            GradientUnits::ObjectBoundingBox => ((point.0 - bx0) / w, (point.1 - by0) / h),
        };
        match self.geometry {
            GradientGeometry::Linear { x1, y1, x2, y2 } => {
                let dx = x2 - x1;
                let dy = y2 - y1;
                let len_sq = dx * dx + dy * dy;
                if len_sq < 1e-12 {
                    return 0.0;
                }
                (((local_point.0 - x1) * dx + (local_point.1 - y1) * dy) / len_sq).clamp(0.0, 1.0)
            }
            GradientGeometry::Radial { cx, cy, r } => {
                let dist = ((local_point.0 - cx).powi(2) + (local_point.1 - cy).powi(2)).sqrt();
                (dist / r.max(1e-9)).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_stop_lut_interpolates_linearly() {
        let stops = vec![
            GradientStop { offset: 0.0, color: Color::rgb(0, 0, 0) },
            GradientStop { offset: 1.0, color: Color::rgb(255, 255, 255) },
        ];
        let lut = GradientLut::build(&stops);
        let mid = lut.sample(0.5);
        assert!((mid.r as i16 - 128).abs() <= 2);
    }

    #[test]
    fn single_stop_lut_is_constant() {
        let stops = vec![GradientStop { offset: 0.3, color: Color::rgb(10, 20, 30) }];
        let lut = GradientLut::build(&stops);
        assert_eq!(lut.sample(0.0), Color::rgb(10, 20, 30));
        assert_eq!(lut.sample(1.0), Color::rgb(10, 20, 30));
    }

    #[test]
    fn linear_offset_runs_zero_to_one_along_the_axis() {
        let g = Gradient {
            stops: vec![],
            geometry: GradientGeometry::Linear { x1: 0.0, y1: 0.0, x2: 10.0, y2: 0.0 },
            units: GradientUnits::UserSpace,
        };
        assert_eq!(g.offset_at((0.0, 5.0), (0.0, 0.0, 1.0, 1.0)), 0.0);
        assert_eq!(g.offset_at((10.0, 5.0), (0.0, 0.0, 1.0, 1.0)), 1.0);
        assert!((g.offset_at((5.0, 5.0), (0.0, 0.0, 1.0, 1.0)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn object_bounding_box_units_normalize_against_the_path_bbox() {
        let g = Gradient {
            stops: vec![],
            geometry: GradientGeometry::Linear { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 },
            units: GradientUnits::ObjectBoundingBox,
        };
        // bbox spans [100, 200]; point at 150 is the bbox midpoint -> offset 0.5
        assert!((g.offset_at((150.0, 0.0), (100.0, 0.0, 200.0, 1.0)) - 0.5).abs() < 1e-9);
    }
}
