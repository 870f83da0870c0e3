use super::{cross, Point2, Vec2};

/// Infinite line passing through `start` and `end`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    start: Point2,
    end: Point2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("lines are parallel")]
pub struct LinesParallelError;

impl Line {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Line through `point` along `direction`.
    pub fn through(point: Point2, direction: Vec2) -> Self {
        Self::new(point, point + direction)
    }

    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    /// Projection parameter of `point`: 0 at `start`, 1 at `end`.
    pub fn parameter_of(&self, point: Point2) -> f64 {
        let line_direction = self.direction();
        let line_length_squared = line_direction.norm_squared();
        if line_length_squared == 0.0 {
            return 0.0;
        }
        (point - self.start).dot(&line_direction) / line_length_squared
    }

    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + self.direction() * t
    }

    /// Closest point restricted to the segment between `start` and `end`.
    pub fn closest_point_on_segment(&self, point: Point2) -> Point2 {
        let t = self.parameter_of(point);
        if t < 0.0 {
            self.start
        } else if t > 1.0 {
            self.end
        } else {
            self.point_at(t)
        }
    }

    pub fn intersection_lines(&self, line: &Line) -> Result<Point2, LinesParallelError> {
        let line_direction = self.direction();
        let other_direction = line.direction();

        let cross_product = cross(&line_direction, &other_direction);
        let scale = line_direction.norm() * other_direction.norm();
        if cross_product.abs() <= f64::EPSILON * scale {
            return Err(LinesParallelError);
        }

        let t = cross(&(line.start - self.start), &other_direction) / cross_product;
        Ok(self.point_at(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perpendiculars_meet_at_blend_center() {
        let a = Line::through(Point2::new(30., 0.), Vec2::new(0., 1.));
        let b = Line::through(Point2::new(50., 20.), Vec2::new(-1., 0.));
        let center = a.intersection_lines(&b).expect("lines cross");
        assert_relative_eq!(center.x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(center.y, 20.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Line::through(Point2::new(0., 0.), Vec2::new(0., 1.));
        let b = Line::through(Point2::new(5., 0.), Vec2::new(0., 3.));
        assert_eq!(a.intersection_lines(&b), Err(LinesParallelError));
    }

    #[test]
    fn segment_projection_is_clamped() {
        let line = Line::new(Point2::new(0., 0.), Point2::new(10., 0.));
        assert_eq!(
            line.closest_point_on_segment(Point2::new(-4., 3.)),
            Point2::new(0., 0.)
        );
        assert_eq!(
            line.closest_point_on_segment(Point2::new(14., -3.)),
            Point2::new(10., 0.)
        );
        let inside = line.closest_point_on_segment(Point2::new(4., 3.));
        assert_relative_eq!(inside.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(inside.y, 0.0, epsilon = 1e-12);
        // the projection parameter itself is not clamped
        assert_relative_eq!(line.parameter_of(Point2::new(14., -3.)), 1.4, epsilon = 1e-12);
    }
}
