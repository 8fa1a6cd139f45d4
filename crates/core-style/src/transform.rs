//! The `transform` symbolizer property (§4.C.2, §6): a per-feature affine
//! applied before the map's view transform. The SVG-transform-syntax
//! *text* grammar mapnik parses this from is the same kind of external
//! "expression parsing" concern spec.md §1 excludes; `Transform` is the
//! value that grammar would produce, built directly by a caller (a style
//! loader sits above this crate and is out of scope).

use glam::{Affine2, Vec2};

#[derive(Debug, Clone)]
pub enum Transform {
    Identity,
    Translate(f64, f64),
    Scale(f64, f64),
    Rotate(f64),
    Matrix(Affine2),
    Compose(Vec<Transform>),
}

impl Default for Transform {
    fn default() -> Self {
        Transform::Identity
    }
}

impl Transform {
    pub fn to_affine(&self) -> Affine2 {
        match self {
            Transform::Identity => Affine2::IDENTITY,
            Transform::Translate(x, y) => Affine2::from_translation(Vec2::new(*x as f32, *y as f32)),
            Transform::Scale(x, y) => Affine2::from_scale(Vec2::new(*x as f32, *y as f32)),
            Transform::Rotate(radians) => Affine2::from_angle(*radians as f32),
            Transform::Matrix(m) => *m,
            Transform::Compose(parts) => parts
                .iter()
                .fold(Affine2::IDENTITY, |acc, part| part.to_affine() * acc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_a_no_op() {
        let p = Transform::Identity.to_affine().transform_point2(Vec2::new(3.0, 4.0));
        assert_eq!(p, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn compose_applies_left_to_right() {
        let t = Transform::Compose(vec![Transform::Translate(10.0, 0.0), Transform::Scale(2.0, 2.0)]);
        let p = t.to_affine().transform_point2(Vec2::new(1.0, 1.0));
        // translate first (1+10, 1), then scale by 2 -> (22, 2)
        assert_eq!(p, Vec2::new(22.0, 2.0));
    }
}
