//! Axis-aligned rectangles in world or view space

use glam::Vec2;

/// Axis-aligned rectangle stored as center and full size
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// Create from center and full size
    #[inline]
    pub const fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Create from min and max corners
    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Check if a point lies inside (edges included)
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Check if two rectangles overlap
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }

    /// Bounding rectangle of this one rotated by `angle` radians about its center
    pub fn rotated_bounds(&self, angle: f32) -> Rect {
        let (sin, cos) = angle.sin_cos();
        let half = self.size * 0.5;
        let extent = Vec2::new(
            half.x * cos.abs() + half.y * sin.abs(),
            half.x * sin.abs() + half.y * cos.abs(),
        );
        Rect::from_center_size(self.center, extent * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corners_and_containment() {
        let rect = Rect::from_min_max(Vec2::new(0.0, 0.0), Vec2::new(10.0, 4.0));
        assert_eq!(rect.center, Vec2::new(5.0, 2.0));
        assert!(rect.contains(Vec2::new(10.0, 4.0)));
        assert!(!rect.contains(Vec2::new(10.1, 2.0)));
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let rect = Rect::from_center_size(Vec2::ZERO, Vec2::new(10.0, 4.0));
        let turned = rect.rotated_bounds(std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(turned.width(), 4.0, epsilon = 1e-4);
        assert_relative_eq!(turned.height(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn overlap_test() {
        let a = Rect::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        let b = Rect::from_center_size(Vec2::new(1.5, 0.0), Vec2::splat(2.0));
        let c = Rect::from_center_size(Vec2::new(5.0, 0.0), Vec2::splat(2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
