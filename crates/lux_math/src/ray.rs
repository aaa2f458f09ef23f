use crate::Vec3;

/// A ray in 3D space with origin, direction, and a maximum parametric distance.
///
/// The direction is normalized on construction, so `t` is a world-space
/// distance. `max_t` bounds occlusion tests: a shadow ray toward a point light
/// stops right at the light instead of running past it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_t: f32,
}

impl Ray {
    /// Create an unbounded ray. `direction` need not be unit length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_t: f32::INFINITY,
        }
    }

    /// Create a ray that ends at `max_t`.
    pub fn bounded(origin: Vec3, direction: Vec3, max_t: f32) -> Self {
        Self::new(origin, direction).with_max_t(max_t)
    }

    /// Create a ray from `from` that ends exactly at `to`.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let offset = to - from;
        Self::bounded(from, offset, offset.length())
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the (unit) direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the maximum parametric distance of the ray.
    #[inline]
    pub fn max_t(&self) -> f32 {
        self.max_t
    }

    /// Same ray with a different maximum distance.
    #[inline]
    pub fn with_max_t(mut self, max_t: f32) -> Self {
        self.max_t = max_t;
        self
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The ray that continues past a hit at `t`.
    ///
    /// The new origin is nudged `epsilon` beyond the hit point and the
    /// remaining distance shrinks by `t`, so a bounded ray still ends at the
    /// same place in space.
    pub fn continued_past(&self, t: f32, epsilon: f32) -> Self {
        Self {
            origin: self.at(t) + self.direction * epsilon,
            direction: self.direction,
            max_t: self.max_t - t,
        }
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            max_t: f32::INFINITY,
        }
    }
}
