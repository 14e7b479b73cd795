//! Narrow-phase intersection tests
//!
//! One exact test per unordered shape pair plus the three ray tests. Every
//! pairwise test treats touching shapes as colliding.

use super::primitives::{closest_points_between_segments, BoundingSphere, Ray};
use super::shape::{WorldBox, WorldCapsule};
use crate::foundation::math::{Vec3, EPSILON};

/// Iterations of the ternary search over the capsule segment
const SEGMENT_SEARCH_ITERATIONS: usize = 64;

/// Box-box: closed intervals overlap on all three axes
pub fn box_box(a: &WorldBox, b: &WorldBox) -> bool {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    (0..3).all(|axis| a_min[axis] <= b_max[axis] && a_max[axis] >= b_min[axis])
}

/// Box-sphere: the box point nearest the sphere center lies in the sphere
pub fn box_sphere(cuboid: &WorldBox, sphere: &BoundingSphere) -> bool {
    if !cuboid.bounding_sphere().intersects(sphere) {
        return false;
    }
    sphere.contains_point(&cuboid.closest_point(&sphere.center))
}

/// Box-capsule: distance from the capsule segment to the box is within the radius
pub fn box_capsule(cuboid: &WorldBox, capsule: &WorldCapsule) -> bool {
    if !cuboid.bounding_sphere().intersects(&capsule.bounding_sphere()) {
        return false;
    }

    let (start, end) = capsule.segment();
    segment_box_distance_squared(&start, &end, cuboid) <= capsule.radius * capsule.radius
}

/// Sphere-capsule: sphere center against the clamped capsule segment
pub fn sphere_capsule(sphere: &BoundingSphere, capsule: &WorldCapsule) -> bool {
    let on_axis = capsule.closest_point_on_axis(&sphere.center);
    let total_radius = sphere.radius + capsule.radius;
    (sphere.center - on_axis).magnitude_squared() <= total_radius * total_radius
}

/// Capsule-capsule: closest points of the two clamped segments
pub fn capsule_capsule(a: &WorldCapsule, b: &WorldCapsule) -> bool {
    let (a_start, a_end) = a.segment();
    let (b_start, b_end) = b.segment();
    let (on_a, on_b) = closest_points_between_segments(&a_start, &a_end, &b_start, &b_end);
    let total_radius = a.radius + b.radius;
    (on_a - on_b).magnitude_squared() <= total_radius * total_radius
}

/// Squared distance between a segment and a box (zero when they touch)
pub fn segment_box_distance_squared(start: &Vec3, end: &Vec3, cuboid: &WorldBox) -> f32 {
    if segment_crosses_box(start, end, cuboid) {
        return 0.0;
    }

    // Distance to a convex set along a segment is convex in the parameter
    let distance_at = |t: f32| {
        let point = start + (end - start) * t;
        (cuboid.closest_point(&point) - point).magnitude_squared()
    };

    let (mut low, mut high) = (0.0_f32, 1.0_f32);
    for _ in 0..SEGMENT_SEARCH_ITERATIONS {
        let third = (high - low) / 3.0;
        let (left, right) = (low + third, high - third);
        if distance_at(left) <= distance_at(right) {
            high = right;
        } else {
            low = left;
        }
    }

    distance_at(0.5 * (low + high)).min(distance_at(0.0)).min(distance_at(1.0))
}

/// Slab clip of a segment against a box
fn segment_crosses_box(start: &Vec3, end: &Vec3, cuboid: &WorldBox) -> bool {
    let direction = end - start;
    let (min, max) = (cuboid.min(), cuboid.max());
    let (mut t_enter, mut t_exit) = (0.0_f32, 1.0_f32);

    for axis in 0..3 {
        if direction[axis].abs() <= EPSILON {
            if start[axis] < min[axis] || start[axis] > max[axis] {
                return false;
            }
            continue;
        }

        let inverse = 1.0 / direction[axis];
        let t1 = (min[axis] - start[axis]) * inverse;
        let t2 = (max[axis] - start[axis]) * inverse;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_enter > t_exit {
            return false;
        }
    }
    true
}

/// Ray-box slab test
///
/// Distance to the entry point, or to the exit point when the origin is
/// inside the box.
pub fn ray_box(ray: &Ray, cuboid: &WorldBox) -> Option<f32> {
    let (min, max) = (cuboid.min(), cuboid.max());
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];

        if direction.abs() <= EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inverse = 1.0 / direction;
        let t1 = (min[axis] - origin) * inverse;
        let t2 = (max[axis] - origin) * inverse;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_min > t_max || t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

/// Ray-capsule test against the cylinder body and both caps
///
/// The capsule is convex, so the hit interval along the ray is the hull of
/// the per-part intervals.
pub fn ray_capsule(ray: &Ray, capsule: &WorldCapsule) -> Option<f32> {
    let (start, end) = capsule.segment();

    // Early out on the closest approach between the ray and the axis
    let far = ray.point_at(ray_reach(ray, capsule));
    let (on_ray, on_axis) = closest_points_between_segments(&ray.origin, &far, &start, &end);
    if (on_ray - on_axis).magnitude_squared() > capsule.radius * capsule.radius {
        return None;
    }

    let parts = [
        sphere_interval(ray, &start, capsule.radius),
        sphere_interval(ray, &end, capsule.radius),
        cylinder_interval(ray, &start, &end, capsule.radius),
    ];

    let (enter, exit) = parts
        .iter()
        .flatten()
        .filter(|(_, exit)| *exit >= 0.0)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(enter, exit), (part_enter, part_exit)| {
            (enter.min(*part_enter), exit.max(*part_exit))
        });

    if enter > exit {
        return None;
    }
    Some(if enter >= 0.0 { enter } else { exit })
}

/// Ray length that is guaranteed to reach past the capsule
fn ray_reach(ray: &Ray, capsule: &WorldCapsule) -> f32 {
    (capsule.center - ray.origin).magnitude() + capsule.height
}

/// Parameter interval where the ray's line is inside a sphere
fn sphere_interval(ray: &Ray, center: &Vec3, radius: f32) -> Option<(f32, f32)> {
    let oc = ray.origin - center;
    let b = oc.dot(&ray.direction);
    let c = oc.magnitude_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some((-b - root, -b + root))
}

/// Parameter interval where the ray's line is inside the finite cylinder
/// spanning `[start, end]`
fn cylinder_interval(ray: &Ray, start: &Vec3, end: &Vec3, radius: f32) -> Option<(f32, f32)> {
    let axis = end - start;
    let length = axis.magnitude();
    if length <= EPSILON {
        return None;
    }
    let axis = axis / length;

    let offset = ray.origin - start;
    let direction_along = ray.direction.dot(&axis);
    let offset_along = offset.dot(&axis);

    // Infinite cylinder, in the plane perpendicular to the axis
    let direction_perp = ray.direction - axis * direction_along;
    let offset_perp = offset - axis * offset_along;
    let a = direction_perp.magnitude_squared();
    let c = offset_perp.magnitude_squared() - radius * radius;

    let (mut t_enter, mut t_exit) = if a <= EPSILON {
        if c > 0.0 {
            return None;
        }
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        let b = offset_perp.dot(&direction_perp);
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        ((-b - root) / a, (-b + root) / a)
    };

    // Clip to the slab between the two end planes
    if direction_along.abs() <= EPSILON {
        if offset_along < 0.0 || offset_along > length {
            return None;
        }
    } else {
        let t1 = -offset_along / direction_along;
        let t2 = (length - offset_along) / direction_along;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    (t_enter <= t_exit).then_some((t_enter, t_exit))
}
