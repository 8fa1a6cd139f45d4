//! Splits a flattened command stream into independent subpaths. Every
//! converter in this crate operates per-subpath and re-joins the results, so
//! this is the one piece of bookkeeping shared by all of them.

use core_geom::vertex::Command;

/// One `MoveTo .. [Close]` run, reduced to its terminal points. `closed` is
/// `true` when the subpath ended in `Close`; curve control points are
/// discarded here on purpose — callers that need them (the smoother, the
/// flattener) walk `Command` directly instead of going through `Subpath`.
#[derive(Debug, Clone, Default)]
pub struct Subpath {
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

pub fn split_subpaths(commands: &[Command]) -> Vec<Subpath> {
    let mut out = Vec::new();
    let mut current: Option<Subpath> = None;
    for cmd in commands {
        match cmd {
            Command::MoveTo { x, y } => {
                if let Some(sub) = current.take() {
                    if !sub.points.is_empty() {
                        out.push(sub);
                    }
                }
                current = Some(Subpath { points: vec![(*x, *y)], closed: false });
            }
            Command::LineTo { x, y } | Command::Curve3 { x, y, .. } | Command::Curve4 { x, y, .. } => {
                if let Some(sub) = current.as_mut() {
                    sub.points.push((*x, *y));
                }
            }
            Command::Close => {
                if let Some(sub) = current.as_mut() {
                    sub.closed = true;
                }
            }
            Command::End => {}
        }
    }
    if let Some(sub) = current {
        if !sub.points.is_empty() {
            out.push(sub);
        }
    }
    out
}

/// Re-emits a sequence of subpaths as a command stream terminated by `End`.
pub fn join_subpaths(subs: &[Subpath]) -> Vec<Command> {
    let mut out = Vec::new();
    for sub in subs {
        emit_subpath(sub, &mut out);
    }
    out.push(Command::End);
    out
}

pub fn emit_subpath(sub: &Subpath, out: &mut Vec<Command>) {
    let mut it = sub.points.iter();
    if let Some(&(x, y)) = it.next() {
        out.push(Command::MoveTo { x, y });
        for &(x, y) in it {
            out.push(Command::LineTo { x, y });
        }
        if sub.closed {
            out.push(Command::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_subpaths_and_tracks_closed_flag() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 1.0, y: 0.0 },
            Command::Close,
            Command::MoveTo { x: 5.0, y: 5.0 },
            Command::LineTo { x: 6.0, y: 5.0 },
            Command::End,
        ];
        let subs = split_subpaths(&cmds);
        assert_eq!(subs.len(), 2);
        assert!(subs[0].closed);
        assert!(!subs[1].closed);
    }

    #[test]
    fn join_roundtrips_split() {
        let cmds = vec![
            Command::MoveTo { x: 0.0, y: 0.0 },
            Command::LineTo { x: 1.0, y: 0.0 },
            Command::LineTo { x: 1.0, y: 1.0 },
            Command::Close,
            Command::End,
        ];
        let subs = split_subpaths(&cmds);
        assert_eq!(join_subpaths(&subs), cmds);
    }
}
