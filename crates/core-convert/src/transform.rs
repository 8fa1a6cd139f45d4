//! Geometry and affine view transforms (§4.C.2-3). Both stages are the same
//! operation — map every coordinate (including Bezier control points)
//! through a `glam::Affine2` — composed in sequence by the caller.

use core_geom::vertex::Command;
use glam::{Affine2, Vec2};

fn map(affine: &Affine2, x: f64, y: f64) -> (f64, f64) {
    let p = affine.transform_point2(Vec2::new(x as f32, y as f32));
    (p.x as f64, p.y as f64)
}

/// Applies `affine` to every coordinate in the stream, preserving command
/// structure exactly (including unflattened `Curve3`/`Curve4`).
pub fn apply_affine(commands: &[Command], affine: &Affine2) -> Vec<Command> {
    commands
        .iter()
        .map(|cmd| match *cmd {
            Command::MoveTo { x, y } => {
                let (x, y) = map(affine, x, y);
                Command::MoveTo { x, y }
            }
            Command::LineTo { x, y } => {
                let (x, y) = map(affine, x, y);
                Command::LineTo { x, y }
            }
            Command::Curve3 { cx, cy, x, y } => {
                let (cx, cy) = map(affine, cx, cy);
                let (x, y) = map(affine, x, y);
                Command::Curve3 { cx, cy, x, y }
            }
            Command::Curve4 { cx1, cy1, cx2, cy2, x, y } => {
                let (cx1, cy1) = map(affine, cx1, cy1);
                let (cx2, cy2) = map(affine, cx2, cy2);
                let (x, y) = map(affine, x, y);
                Command::Curve4 { cx1, cy1, cx2, cy2, x, y }
            }
            Command::Close => Command::Close,
            Command::End => Command::End,
        })
        .collect()
}

/// Builds the map's view transform: `extent -> screen` scaled by
/// `scale_factor`, matching the sign flip between geographic `y`-up space
/// and screen `y`-down space.
pub fn view_affine(
    extent_min_x: f64,
    extent_min_y: f64,
    extent_max_x: f64,
    extent_max_y: f64,
    screen_width: f64,
    screen_height: f64,
    scale_factor: f64,
) -> Affine2 {
    let ext_w = (extent_max_x - extent_min_x).max(f64::EPSILON);
    let ext_h = (extent_max_y - extent_min_y).max(f64::EPSILON);
    let sx = (screen_width / ext_w) as f32 * scale_factor as f32;
    let sy = -((screen_height / ext_h) as f32) * scale_factor as f32;
    let translate = Vec2::new(
        -(extent_min_x as f32) * sx,
        -(extent_max_y as f32) * sy,
    );
    Affine2::from_scale_angle_translation(Vec2::new(sx, sy), 0.0, translate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_affine_leaves_points_unchanged() {
        let cmds = vec![Command::MoveTo { x: 3.0, y: 4.0 }, Command::End];
        let out = apply_affine(&cmds, &Affine2::IDENTITY);
        assert_eq!(out, cmds);
    }

    #[test]
    fn view_affine_maps_extent_corners_onto_screen_corners() {
        let affine = view_affine(0.0, 0.0, 100.0, 100.0, 200.0, 200.0, 1.0);
        let top_left = affine.transform_point2(Vec2::new(0.0, 100.0));
        let bottom_right = affine.transform_point2(Vec2::new(100.0, 0.0));
        assert!((top_left.x - 0.0).abs() < 1e-3 && (top_left.y - 0.0).abs() < 1e-3);
        assert!((bottom_right.x - 200.0).abs() < 1e-3 && (bottom_right.y - 200.0).abs() < 1e-3);
    }
}
