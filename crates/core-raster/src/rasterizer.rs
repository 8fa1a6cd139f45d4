//! The scanline anti-aliased rasterizer itself (§4.D).

use core_geom::vertex::{Command, VertexStream};

use crate::cell::CellGrid;
use crate::fill::FillRule;
use crate::gamma::Gamma;

#[derive(Debug, Clone, Copy)]
pub struct ClipBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl ClipBox {
    pub fn contains_x(&self, x: i64) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn contains_y(&self, y: i64) -> bool {
        y >= self.min_y && y <= self.max_y
    }
}

/// One filled run: pixels `[x_start, x_end)` on row `y`, all at the same
/// `alpha` (a "solid span" in 4.D's wording — width 1 for the per-cell
/// partial-coverage pixel, wider for the constant-coverage run between
/// cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub y: i64,
    pub x_start: i64,
    pub x_end: i64,
    pub alpha: f64,
}

/// Accumulates cell coverage from a vertex stream, then produces the
/// resulting anti-aliased spans. One rasterizer instance is used per
/// symbolizer fill (it is cheap to build and is not reused across
/// features — matching how 4.H dispatches a fresh converter chain and
/// consumer per feature).
#[derive(Debug, Default)]
pub struct Rasterizer {
    cells: CellGrid,
    start_of_subpath: Option<(f64, f64)>,
    last: Option<(f64, f64)>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds every command through to `Command::End`, closing each subpath
    /// against its own start point even when the source never emitted an
    /// explicit `Close` — a fill rasterizer always treats its input as
    /// closed rings.
    pub fn add_stream<S: VertexStream + ?Sized>(&mut self, stream: &mut S) {
        loop {
            match stream.vertex() {
                Command::MoveTo { x, y } => {
                    self.close_current();
                    self.start_of_subpath = Some((x, y));
                    self.last = Some((x, y));
                }
                Command::LineTo { x, y } | Command::Curve3 { x, y, .. } | Command::Curve4 { x, y, .. } => {
                    if let Some((lx, ly)) = self.last {
                        render_line(&mut self.cells, lx, ly, x, y);
                    }
                    self.last = Some((x, y));
                }
                Command::Close => self.close_current(),
                Command::End => {
                    self.close_current();
                    break;
                }
            }
        }
    }

    fn close_current(&mut self) {
        if let (Some(start), Some(last)) = (self.start_of_subpath, self.last) {
            if start != last {
                render_line(&mut self.cells, last.0, last.1, start.0, start.1);
            }
        }
    }

    /// Sorts and scan-converts the accumulated cells into AA spans, in row
    /// order. Degenerate inputs (no cells touched) yield no spans.
    pub fn sweep(self, rule: FillRule, gamma: Gamma, clip: Option<ClipBox>) -> Vec<Span> {
        if self.cells.is_empty() {
            return Vec::new();
        }
        let sorted = self.cells.sorted_cells();
        let mut spans = Vec::new();
        let mut row_start = 0;
        while row_start < sorted.len() {
            let y = sorted[row_start].1;
            let mut row_end = row_start;
            while row_end < sorted.len() && sorted[row_end].1 == y {
                row_end += 1;
            }
            if clip.map(|c| c.contains_y(y)).unwrap_or(true) {
                scan_row(&sorted[row_start..row_end], y, rule, gamma, clip, &mut spans);
            }
            row_start = row_end;
        }
        spans
    }
}

fn scan_row(
    row_cells: &[(i64, i64, crate::cell::Cell)],
    y: i64,
    rule: FillRule,
    gamma: Gamma,
    clip: Option<ClipBox>,
    out: &mut Vec<Span>,
) {
    let mut cover_sum = 0.0;
    let mut prev_x: Option<i64> = None;
    for &(x, _, cell) in row_cells {
        if let Some(px) = prev_x {
            if x > px + 1 {
                let alpha = gamma.apply(rule.alpha(cover_sum));
                push_span(out, y, px + 1, x, alpha, clip);
            }
        }
        cover_sum += cell.cover;
        let cell_alpha = gamma.apply(rule.alpha(cover_sum - cell.area * 0.5));
        push_span(out, y, x, x + 1, cell_alpha, clip);
        prev_x = Some(x);
    }
}

fn push_span(out: &mut Vec<Span>, y: i64, mut x_start: i64, mut x_end: i64, alpha: f64, clip: Option<ClipBox>) {
    if alpha <= 0.0 {
        return;
    }
    if let Some(c) = clip {
        x_start = x_start.max(c.min_x);
        x_end = x_end.min(c.max_x + 1);
    }
    if x_end > x_start {
        out.push(Span { y, x_start, x_end, alpha });
    }
}

/// Walks a segment row-by-row, then column-by-column within each row,
/// accumulating `cover += Δy` and `area += Δy · (x_enter + x_exit)` exactly
/// as 4.D describes (`x_enter`/`x_exit` here are cell-local fractions in
/// `[0, 1]` rather than the ancestor's subpixel-fixed-point units; the sum
/// `cover − area/2` used at scan-conversion time is unaffected by that
/// choice of units).
fn render_line(cells: &mut CellGrid, x0: f64, y0: f64, x1: f64, y1: f64) {
    if y0 == y1 {
        return; // horizontal edges sweep no vertical coverage
    }
    let sign = if y1 > y0 { 1.0 } else { -1.0 };
    let (ax, ay, bx, by) = if y1 > y0 { (x0, y0, x1, y1) } else { (x1, y1, x0, y0) };
    let dxdy = (bx - ax) / (by - ay);

    let mut row = ay.floor() as i64;
    let mut cy = ay;
    let mut cx = ax;
    while cy < by {
        let row_bottom = (row + 1) as f64;
        let seg_y1 = by.min(row_bottom);
        let seg_x1 = ax + dxdy * (seg_y1 - ay);
        render_row_segment(cells, row, cy, cx, seg_y1, seg_x1, sign);
        cy = seg_y1;
        cx = seg_x1;
        row += 1;
    }
}

fn render_row_segment(cells: &mut CellGrid, row: i64, y0: f64, x0: f64, y1: f64, x1: f64, sign: f64) {
    let dy_total = y1 - y0;
    if dy_total <= 0.0 {
        return;
    }
    if (x1 - x0).abs() < 1e-12 {
        let col = x0.floor() as i64;
        let frac = (x0 - col as f64).clamp(0.0, 1.0);
        cells.add(col, row, sign * dy_total, sign * dy_total * 2.0 * frac);
        return;
    }

    let dydx = dy_total / (x1 - x0);
    let step: i64 = if x1 > x0 { 1 } else { -1 };
    let mut cx = x0;
    let mut cy = y0;
    let mut col = x0.floor() as i64;
    loop {
        let boundary = if step > 0 { (col + 1) as f64 } else { col as f64 };
        let reached_end = if step > 0 { boundary >= x1 } else { boundary <= x1 };
        let (next_x, next_y) = if reached_end {
            (x1, y1)
        } else {
            (boundary, y0 + dydx * (boundary - x0))
        };
        let seg_dy = (next_y - cy) * sign;
        let enter_frac = (cx - col as f64).clamp(0.0, 1.0);
        let exit_frac = (next_x - col as f64).clamp(0.0, 1.0);
        cells.add(col, row, seg_dy, seg_dy * (enter_frac + exit_frac));
        if reached_end {
            break;
        }
        cx = next_x;
        cy = next_y;
        col += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::vertex::VecStream;

    fn stream_of(cmds: Vec<Command>) -> VecStream {
        VecStream::new(cmds)
    }

    #[test]
    fn filling_a_10x10_square_covers_exactly_its_interior() {
        let mut stream = stream_of(vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 10.0 },
            Command::LineTo { x: 0.0, y: 10.0 },
            Command::Close,
            Command::End,
        ]);
        let mut r = Rasterizer::new();
        r.add_stream(&mut stream);
        let spans = r.sweep(FillRule::NonZero, Gamma::default(), None);
        let total_pixels: i64 = spans.iter().map(|s| s.x_end - s.x_start).sum();
        let full_alpha_pixels = spans.iter().filter(|s| (s.alpha - 1.0).abs() < 1e-6).count() as i64;
        assert_eq!(total_pixels, 100);
        assert_eq!(full_alpha_pixels, 100);
        let rows: std::collections::HashSet<i64> = spans.iter().map(|s| s.y).collect();
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn a_triangle_has_partially_covered_edge_pixels() {
        let mut stream = stream_of(vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::LineTo { x: 0.0, y: 10.0 },
            Command::Close,
            Command::End,
        ]);
        let mut r = Rasterizer::new();
        r.add_stream(&mut stream);
        let spans = r.sweep(FillRule::NonZero, Gamma::default(), None);
        assert!(spans.iter().any(|s| s.alpha > 0.0 && s.alpha < 1.0));
    }

    #[test]
    fn an_implicitly_unclosed_subpath_still_fills() {
        let mut stream = stream_of(vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 4.0, y: 0.0 },
            Command::LineTo { x: 4.0, y: 4.0 },
            Command::LineTo { x: 0.0, y: 4.0 },
            Command::End, // no explicit Close
        ]);
        let mut r = Rasterizer::new();
        r.add_stream(&mut stream);
        let spans = r.sweep(FillRule::NonZero, Gamma::default(), None);
        let total_pixels: i64 = spans.iter().map(|s| s.x_end - s.x_start).sum();
        assert_eq!(total_pixels, 16);
    }

    #[test]
    fn clip_box_discards_cells_outside_it() {
        let mut stream = stream_of(vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 20.0, y: 0.0 },
            Command::LineTo { x: 20.0, y: 20.0 },
            Command::LineTo { x: 0.0, y: 20.0 },
            Command::Close,
            Command::End,
        ]);
        let mut r = Rasterizer::new();
        r.add_stream(&mut stream);
        let clip = ClipBox { min_x: 0, min_y: 0, max_x: 9, max_y: 9 };
        let spans = r.sweep(FillRule::NonZero, Gamma::default(), Some(clip));
        assert!(spans.iter().all(|s| s.x_end - 1 <= 9 && s.y <= 9));
    }

    #[test]
    fn even_odd_rule_leaves_a_hole_where_two_rings_overlap() {
        // Two overlapping squares wound the same direction; the overlap
        // region is covered twice and should cancel under even-odd.
        let mut stream = stream_of(vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 0.0 },
            Command::LineTo { x: 10.0, y: 10.0 },
            Command::LineTo { x: 0.0, y: 10.0 },
            Command::Close,
            Command::MoveTo { x: 5.0, y: 0.0 },
            Command::LineTo { x: 15.0, y: 0.0 },
            Command::LineTo { x: 15.0, y: 10.0 },
            Command::LineTo { x: 5.0, y: 10.0 },
            Command::Close,
            Command::End,
        ]);
        let mut r = Rasterizer::new();
        r.add_stream(&mut stream);
        let spans = r.sweep(FillRule::EvenOdd, Gamma::default(), None);
        let total_pixels: i64 = spans.iter().filter(|s| (s.alpha - 1.0).abs() < 1e-6).map(|s| s.x_end - s.x_start).sum();
        // full squares would cover 200px; the 5..10 overlap column cancels.
        assert!(total_pixels < 200);
    }
}
