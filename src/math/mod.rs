pub mod line;

pub use line::*;

pub type Point2 = na::Point2<f64>;
pub type Vec2 = na::Vector2<f64>;

/// z component of the 3D cross product of two planar vectors.
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Unsigned angle between two vectors, in `[0, PI]`.
pub fn angle_between(a: &Vec2, b: &Vec2) -> f64 {
    cross(a, b).abs().atan2(a.dot(b))
}

/// Counter clockwise rotation of `v` by `radians`.
pub fn rotate(v: &Vec2, radians: f64) -> Vec2 {
    na::Rotation2::new(radians) * *v
}

/// Normal of `v`, rotated a quarter turn counter clockwise.
pub fn normal(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
