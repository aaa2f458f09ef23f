use crate::{Interval, Vec3};

/// Axis-Aligned Bounding Box, used to pick split axes for spatial indices.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// A box containing nothing; grows from here with `including`.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Tightest box around a set of points. Empty input gives `Aabb::EMPTY`.
    pub fn enclosing<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        points
            .into_iter()
            .fold(Self::EMPTY, |bounds, p| bounds.including(p))
    }

    /// Smallest box containing `self` and `p`.
    pub fn including(&self, p: Vec3) -> Self {
        Self {
            x: self.x.including(p.x),
            y: self.y.including(p.y),
            z: self.z.including(p.z),
        }
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    /// Returns true if `p` lies inside or on the boundary.
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_corners() {
        let aabb = Aabb::enclosing([Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0)]);

        assert_eq!(aabb.x, Interval::new(0.0, 10.0));
        assert_eq!(aabb.y, Interval::new(0.0, 10.0));
        assert_eq!(aabb.z, Interval::new(0.0, 10.0));
    }

    #[test]
    fn test_aabb_enclosing() {
        let points = [
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.5),
            Vec3::new(0.0, 0.0, -4.0),
        ];
        let aabb = Aabb::enclosing(points);

        for p in points {
            assert!(aabb.contains(p));
        }
        assert_eq!(aabb.longest_axis(), 1);
        assert!(Aabb::enclosing(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::EMPTY.including(Vec3::ZERO).including(Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::EMPTY.including(Vec3::ZERO).including(Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::EMPTY.including(Vec3::ZERO).including(Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);
    }
}
