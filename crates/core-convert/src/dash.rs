//! Dash generator (§4.C.7): walks a flattened polyline by arc length,
//! emitting `MoveTo`/`LineTo` runs for each "dash-on" interval and skipping
//! the "gap" intervals in between.

use core_geom::vertex::Command;

use crate::subpath::{split_subpaths, Subpath};

/// One `(dash_len, gap_len)` pair in pixels, as configured by
/// `stroke-dasharray`.
pub type DashPattern = Vec<(f64, f64)>;

struct Walker<'p> {
    pattern: &'p DashPattern,
    total: f64,
    idx: usize,
    remaining: f64,
    on: bool,
}

impl<'p> Walker<'p> {
    fn new(pattern: &'p DashPattern) -> Option<Self> {
        let total: f64 = pattern.iter().map(|(d, g)| d + g).sum();
        if pattern.is_empty() || total <= 0.0 {
            return None;
        }
        Some(Self {
            pattern,
            total,
            idx: 0,
            remaining: pattern[0].0.max(0.0),
            on: true,
        })
    }

    fn advance(&mut self, mut len: f64, mut on_run: impl FnMut(f64), mut off_run: impl FnMut(f64)) {
        while len > 0.0 {
            if self.remaining <= 0.0 {
                self.idx = (self.idx + 1) % self.pattern.len();
                self.on = !self.on;
                self.remaining = if self.on {
                    self.pattern[self.idx].0
                } else {
                    self.pattern[self.idx].1
                };
                if self.remaining <= 0.0 {
                    continue;
                }
            }
            let step = len.min(self.remaining);
            if self.on {
                on_run(step);
            } else {
                off_run(step);
            }
            len -= step;
            self.remaining -= step;
        }
    }
}

fn dash_points(points: &[(f64, f64)], closed: bool, pattern: &DashPattern) -> Vec<Subpath> {
    if points.len() < 2 {
        return vec![];
    }
    let mut walker = match Walker::new(pattern) {
        Some(w) => w,
        None => {
            return vec![Subpath { points: points.to_vec(), closed }];
        }
    };

    let mut out = Vec::new();
    let mut current: Option<Vec<(f64, f64)>> = if walker.on {
        Some(vec![points[0]])
    } else {
        None
    };

    let mut visit = |a: (f64, f64), b: (f64, f64)| {
        let seg_len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        if seg_len < f64::EPSILON {
            return;
        }
        let (dx, dy) = ((b.0 - a.0) / seg_len, (b.1 - a.1) / seg_len);
        let mut traveled = 0.0;
        walker.advance(
            seg_len,
            |step| {
                traveled += step;
                let p = (a.0 + dx * traveled, a.1 + dy * traveled);
                current.get_or_insert_with(Vec::new).push(p);
            },
            |step| {
                traveled += step;
                if let Some(run) = current.take() {
                    if run.len() >= 2 {
                        out.push(Subpath { points: run, closed: false });
                    }
                }
            },
        );
    };

    let n = points.len();
    let edges = if closed { n } else { n - 1 };
    for i in 0..edges {
        visit(points[i], points[(i + 1) % n]);
    }
    if let Some(run) = current.take() {
        if run.len() >= 2 {
            out.push(Subpath { points: run, closed: false });
        }
    }
    out
}

pub fn dash(commands: &[Command], pattern: &DashPattern) -> Vec<Command> {
    let mut subs = Vec::new();
    for sub in split_subpaths(commands) {
        subs.extend(dash_points(&sub.points, sub.closed, pattern));
    }
    crate::subpath::join_subpaths(&subs)
}
