//! Primitive collision types and segment helpers
//!
//! Value types shared by every shape: rays, world-space bounds, bounding
//! spheres and raycast results, plus the closest-point helpers the capsule
//! tests are built on.

use crate::foundation::math::{utils, Vec3, EPSILON};
use crate::physics::registry::ColliderHandle;

/// A ray for ray casting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized by [`Ray::new`])
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray, normalizing the direction
    ///
    /// A zero direction stays zero; such a ray only ever "hits" shapes that
    /// contain its origin.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(EPSILON).unwrap_or_else(Vec3::zeros),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Projection of `point` onto the ray's supporting line
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let length_squared = self.direction.magnitude_squared();
        if length_squared <= EPSILON {
            return self.origin;
        }
        let t = (point - self.origin).dot(&self.direction) / length_squared;
        self.point_at(t)
    }

    /// Closest points between the supporting lines of two rays
    ///
    /// Returns `(on_self, on_other)`. Parallel lines pair this ray's origin
    /// with its projection onto the other line.
    pub fn closest_points(&self, other: &Ray) -> (Vec3, Vec3) {
        let to_other = self.origin - other.origin;

        let length_squared = self.direction.magnitude_squared();
        let other_length_squared = other.direction.magnitude_squared();

        let angle = self.direction.dot(&other.direction);
        let angle_to_diff = self.direction.dot(&to_other);
        let other_angle_to_diff = other.direction.dot(&to_other);

        let denominator = length_squared * other_length_squared - angle * angle;

        if utils::float_equals(denominator, 0.0) {
            let along_other = if other_length_squared > EPSILON {
                other_angle_to_diff / other_length_squared
            } else {
                0.0
            };
            return (self.origin, other.point_at(along_other));
        }

        let t = (angle * other_angle_to_diff - other_length_squared * angle_to_diff) / denominator;
        let s = (length_squared * other_angle_to_diff - angle * angle_to_diff) / denominator;
        (self.point_at(t), other.point_at(s))
    }

    /// Squared distance from `point` to the ray's supporting line
    pub fn distance_squared_from_point(&self, point: &Vec3) -> f32 {
        (point - self.closest_point(point)).magnitude_squared()
    }

    /// Squared distance between the supporting lines of two rays
    pub fn distance_squared_from_ray(&self, other: &Ray) -> f32 {
        let (closest, other_closest) = self.closest_points(other);
        (closest - other_closest).magnitude_squared()
    }
}

/// World-space extents of a collider
///
/// Always derived from the collider's local shape and its owner's current
/// transform; never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// World-space center
    pub center: Vec3,
    /// Full size of the axis-aligned box
    pub size: Vec3,
    /// Radius of the conservative bounding sphere
    pub sphere_radius: f32,
}

impl Bounds {
    /// Creates new bounds
    pub fn new(center: Vec3, size: Vec3, sphere_radius: f32) -> Self {
        Self {
            center,
            size,
            sphere_radius,
        }
    }

    /// Half of the box size
    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    /// Minimum corner of the box
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents()
    }

    /// Maximum corner of the box
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents()
    }

    /// Bounding sphere of these bounds
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.sphere_radius)
    }
}

/// A bounding sphere for coarse collision checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether the point lies inside or on the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects with another (touching counts)
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Whether the ray's supporting line passes within the sphere
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        ray.distance_squared_from_point(&self.center) <= self.radius * self.radius
    }

    /// Entry distance of a ray into this sphere
    ///
    /// Returns the exit distance when the origin is inside, and `None` when
    /// the sphere is missed or lies behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        // Solve |origin + t*direction - center|^2 = radius^2
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        if a <= EPSILON {
            return (c <= 0.0).then_some(0.0);
        }

        let b = 2.0 * oc.dot(&ray.direction);
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// Result of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Hit position, `(+inf, +inf, +inf)` when nothing was hit
    pub position: Vec3,
    /// Hit collider
    pub collider: Option<ColliderHandle>,
    /// Distance from the ray origin, `+inf` when nothing was hit
    pub distance: f32,
}

impl RaycastHit {
    /// The "nothing hit" sentinel
    pub fn none() -> Self {
        Self {
            position: Vec3::repeat(f32::INFINITY),
            collider: None,
            distance: f32::INFINITY,
        }
    }

    /// Whether this result holds a hit
    pub fn is_hit(&self) -> bool {
        self.collider.is_some()
    }
}

impl Default for RaycastHit {
    fn default() -> Self {
        Self::none()
    }
}

/// Closest point to `point` on the segment `[start, end]`
///
/// Degenerate segments return `start`.
pub fn closest_point_on_segment(point: &Vec3, start: &Vec3, end: &Vec3) -> Vec3 {
    let segment = end - start;
    let length_squared = segment.magnitude_squared();
    if length_squared <= EPSILON * EPSILON {
        return *start;
    }

    let t = (point - start).dot(&segment) / length_squared;
    utils::lerp_vec(start, end, utils::clamp(t, 0.0, 1.0))
}

/// Closest points between the segments `[p1, q1]` and `[p2, q2]`
///
/// Closed form from Ericson, "Real-Time Collision Detection" 5.1.9, with the
/// degenerate and parallel cases folded into clamps.
pub fn closest_points_between_segments(p1: &Vec3, q1: &Vec3, p2: &Vec3, q2: &Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    let degenerate = EPSILON * EPSILON;

    if a <= degenerate && e <= degenerate {
        return (*p1, *p2);
    }

    let (s, t) = if a <= degenerate {
        (0.0, utils::clamp(f / e, 0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= degenerate {
            (utils::clamp(-c / a, 0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denominator = a * e - b * b;

            // Parallel segments: any s works, start from p1
            let mut s = if denominator > degenerate {
                utils::clamp((b * f - c * e) / denominator, 0.0, 1.0)
            } else {
                0.0
            };

            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = utils::clamp(-c / a, 0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = utils::clamp((b - c) / a, 0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(ray.direction, Vec3::new(0.0, 0.0, 1.0));

        let degenerate = Ray::new(Vec3::zeros(), Vec3::zeros());
        assert_eq!(degenerate.direction, Vec3::zeros());
    }

    #[test]
    fn test_ray_closest_point_and_distance() {
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        let point = Vec3::new(3.0, 4.0, 0.0);

        assert_relative_eq!(ray.closest_point(&point), Vec3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(ray.distance_squared_from_point(&point), 16.0);
    }

    #[test]
    fn test_ray_closest_points_skew_and_parallel() {
        let a = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        let b = Ray::new(Vec3::new(2.0, 1.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

        let (on_a, on_b) = a.closest_points(&b);
        assert_relative_eq!(on_a, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(on_b, Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(a.distance_squared_from_ray(&b), 1.0, epsilon = 1e-5);

        let parallel = Ray::new(Vec3::new(5.0, 2.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let (on_a, on_parallel) = a.closest_points(&parallel);
        assert_relative_eq!(on_a, Vec3::zeros());
        assert_relative_eq!(on_parallel, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_bounding_sphere_intersects_inclusive() {
        let a = BoundingSphere::new(Vec3::zeros(), 1.0);
        let touching = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let apart = BoundingSphere::new(Vec3::new(2.1, 0.0, 0.0), 1.0);

        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }

    #[test]
    fn test_bounding_sphere_ray_entry_and_exit() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 0.0, 10.0), 2.0);

        let outside = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(sphere.intersect_ray(&outside).unwrap(), 8.0, epsilon = 1e-5);

        let inside = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(sphere.intersect_ray(&inside).unwrap(), 2.0, epsilon = 1e-5);

        let behind = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.intersect_ray(&behind).is_none());
    }

    #[test]
    fn test_raycast_hit_none_sentinel() {
        let hit = RaycastHit::none();
        assert!(!hit.is_hit());
        assert!(hit.distance.is_infinite());
        assert!(hit.position.x.is_infinite());
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let start = Vec3::new(0.0, 0.0, 0.0);
        let end = Vec3::new(0.0, 4.0, 0.0);

        assert_relative_eq!(
            closest_point_on_segment(&Vec3::new(1.0, 2.0, 0.0), &start, &end),
            Vec3::new(0.0, 2.0, 0.0)
        );
        assert_relative_eq!(closest_point_on_segment(&Vec3::new(0.0, 9.0, 0.0), &start, &end), end);
        assert_relative_eq!(closest_point_on_segment(&Vec3::new(0.0, -9.0, 0.0), &start, &end), start);
        assert_relative_eq!(closest_point_on_segment(&Vec3::new(3.0, 3.0, 3.0), &start, &start), start);
    }

    #[test]
    fn test_closest_points_between_segments() {
        let (a, b) = closest_points_between_segments(
            &Vec3::new(-1.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(0.0, 2.0, -1.0),
            &Vec3::new(0.0, 2.0, 1.0),
        );
        assert_relative_eq!(a, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(b, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);

        // Parallel, offset along the axis: endpoints clamp
        let (a, b) = closest_points_between_segments(
            &Vec3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 0.0, 0.0),
            &Vec3::new(3.0, 1.0, 0.0),
            &Vec3::new(5.0, 1.0, 0.0),
        );
        assert_relative_eq!(a, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(b, Vec3::new(3.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_bounds_corners() {
        let bounds = Bounds::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 4.0, 6.0), 1.0);
        assert_relative_eq!(bounds.min(), Vec3::new(0.0, -1.0, -2.0));
        assert_relative_eq!(bounds.max(), Vec3::new(2.0, 3.0, 4.0));
    }
}
