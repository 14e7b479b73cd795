//! Collider shapes
//!
//! Shapes are stored in model space (relative to the owning entity) and
//! transformed to world space on demand, once per query. Nothing derived
//! from the owner's transform is ever cached.

use super::narrow_phase;
use super::primitives::{closest_point_on_segment, BoundingSphere, Bounds, Ray};
use crate::foundation::math::{utils, Quat, Transform, Vec3, EPSILON};
use crate::physics::error::{PhysicsError, PhysicsResult};

/// Collider shape in model space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Axis-aligned box
    Box {
        /// Offset from the owner's origin
        center: Vec3,
        /// Full size along each axis
        size: Vec3,
    },
    /// Sphere
    Sphere {
        /// Offset from the owner's origin
        center: Vec3,
        /// Radius
        radius: f32,
    },
    /// Capsule: a segment swept by a sphere
    Capsule {
        /// Offset from the owner's origin
        center: Vec3,
        /// Unit axis direction
        up: Vec3,
        /// Total height, caps included (never below `2 * radius`)
        height: f32,
        /// Radius of the swept sphere
        radius: f32,
    },
}

impl ColliderShape {
    /// Creates a box shape
    pub fn cuboid(center: Vec3, size: Vec3) -> PhysicsResult<Self> {
        check_finite("center", &center)?;
        check_finite("size", &size)?;
        if size.iter().any(|extent| *extent < 0.0) {
            return Err(PhysicsError::InvalidShape(format!("negative box size {size:?}")));
        }
        Ok(Self::Box { center, size })
    }

    /// Creates a sphere shape
    pub fn sphere(center: Vec3, radius: f32) -> PhysicsResult<Self> {
        check_finite("center", &center)?;
        check_length("radius", radius)?;
        Ok(Self::Sphere { center, radius })
    }

    /// Creates a capsule shape
    ///
    /// `up` is normalized and `height` is raised to `2 * radius` when smaller.
    pub fn capsule(center: Vec3, up: Vec3, height: f32, radius: f32) -> PhysicsResult<Self> {
        check_finite("center", &center)?;
        check_finite("up", &up)?;
        check_length("height", height)?;
        check_length("radius", radius)?;

        let up = up
            .try_normalize(EPSILON)
            .ok_or_else(|| PhysicsError::InvalidShape("capsule up axis is zero".to_string()))?;

        Ok(Self::Capsule {
            center,
            up,
            height: height.max(radius * 2.0),
            radius,
        })
    }

    /// Shape name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Capsule { .. } => "capsule",
        }
    }

    /// Bounds in model space
    pub fn local_bounds(&self) -> Bounds {
        match *self {
            Self::Box { center, size } => Bounds::new(center, size, (size * 0.5).magnitude()),
            Self::Sphere { center, radius } => Bounds::new(center, Vec3::repeat(radius * 2.0), radius),
            Self::Capsule {
                center,
                up,
                height,
                radius,
            } => {
                let segment = height - radius * 2.0;
                let size = up.abs() * segment + Vec3::repeat(radius * 2.0);
                Bounds::new(center, size, height * 0.5)
            }
        }
    }

    /// Bounds in world space under the owner's global transform
    pub fn world_bounds(&self, transform: &Transform) -> Bounds {
        let local = self.local_bounds();
        Bounds::new(
            transform.transform_point(&local.center),
            local.size.component_mul(&transform.scale).abs(),
            local.sphere_radius * transform.max_scale(),
        )
    }

    /// Transform this shape to world space
    ///
    /// Boxes stay axis aligned: only their center follows the rotation.
    /// Sphere radii and capsule heights grow with the largest absolute scale
    /// factor; a capsule radius only with the scale across its axis.
    pub fn to_world_space(&self, transform: &Transform) -> WorldSpaceShape {
        let bounds = self.world_bounds(transform);
        match *self {
            Self::Box { .. } => WorldSpaceShape::Box(WorldBox::new(bounds.center, bounds.half_extents())),
            Self::Sphere { .. } => WorldSpaceShape::Sphere(BoundingSphere::new(bounds.center, bounds.sphere_radius)),
            Self::Capsule { up, radius, .. } => {
                let world_up = (transform.rotation * up)
                    .try_normalize(EPSILON)
                    .unwrap_or_else(Vec3::y);
                WorldSpaceShape::Capsule(WorldCapsule::new(
                    bounds.center,
                    world_up,
                    bounds.sphere_radius * 2.0,
                    radius * cross_section_scale(&up, &transform.scale),
                ))
            }
        }
    }
}

/// Largest stretch of the plane perpendicular to a model-space capsule axis
///
/// The reference frame is the one rotating `+y` onto `up`; its `x` and `z`
/// axes span the cross section.
fn cross_section_scale(up: &Vec3, scale: &Vec3) -> f32 {
    let frame = Quat::rotation_between(&Vec3::y(), up)
        .unwrap_or_else(|| Quat::from_axis_angle(&Vec3::x_axis(), std::f32::consts::PI));
    let right = (frame * Vec3::x()).component_mul(scale);
    let front = (frame * Vec3::z()).component_mul(scale);
    right.magnitude().max(front.magnitude())
}

fn check_finite(name: &str, value: &Vec3) -> PhysicsResult<()> {
    if utils::is_finite(value) {
        Ok(())
    } else {
        Err(PhysicsError::InvalidShape(format!("{name} is not finite: {value:?}")))
    }
}

fn check_length(name: &str, value: f32) -> PhysicsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidShape(format!("{name} must be finite and non-negative, got {value}")))
    }
}

/// World-space axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBox {
    /// Center
    pub center: Vec3,
    /// Half of the size along each axis
    pub half_extents: Vec3,
}

impl WorldBox {
    /// Creates a world-space box
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Closed containment test
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|axis| min[axis] <= point[axis] && point[axis] <= max[axis])
    }

    /// Closest point inside the box
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        utils::clamp_vec(point, &self.min(), &self.max())
    }

    /// Closest point on the box surface
    ///
    /// Interior points snap to the nearest face; ties go to x, then y, then z.
    pub fn closest_point_on_surface(&self, point: &Vec3) -> Vec3 {
        if !self.contains_point(point) {
            return self.closest_point(point);
        }

        let (min, max) = (self.min(), self.max());
        let mut best = *point;
        let mut best_distance = f32::INFINITY;
        for axis in 0..3 {
            let mut snapped = *point;
            snapped[axis] = utils::snap(point[axis], min[axis], max[axis]);
            let distance = (snapped[axis] - point[axis]).abs();
            if distance < best_distance {
                best_distance = distance;
                best = snapped;
            }
        }
        best
    }

    /// Sphere through the box corners
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.half_extents.magnitude())
    }
}

/// World-space capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCapsule {
    /// Center of the central segment
    pub center: Vec3,
    /// Unit axis
    pub up: Vec3,
    /// Total height, caps included
    pub height: f32,
    /// Radius
    pub radius: f32,
}

impl WorldCapsule {
    /// Creates a world-space capsule
    pub fn new(center: Vec3, up: Vec3, height: f32, radius: f32) -> Self {
        Self {
            center,
            up,
            height: height.max(radius * 2.0),
            radius,
        }
    }

    /// Half length of the central segment
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }

    /// End points of the central segment
    pub fn segment(&self) -> (Vec3, Vec3) {
        let offset = self.up * self.half_segment();
        (self.center - offset, self.center + offset)
    }

    /// Closest point on the central segment
    pub fn closest_point_on_axis(&self, point: &Vec3) -> Vec3 {
        let (start, end) = self.segment();
        closest_point_on_segment(point, &start, &end)
    }

    /// Whether the point lies inside or on the capsule
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.closest_point_on_axis(point)).magnitude_squared() <= self.radius * self.radius
    }

    /// Closest point inside the capsule
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let on_axis = self.closest_point_on_axis(point);
        let offset = point - on_axis;
        let distance = offset.magnitude();
        if distance <= self.radius {
            return *point;
        }
        on_axis + offset * (self.radius / distance)
    }

    /// Closest point on the capsule surface
    pub fn closest_point_on_surface(&self, point: &Vec3) -> Vec3 {
        let on_axis = self.closest_point_on_axis(point);
        let direction = (point - on_axis)
            .try_normalize(EPSILON)
            .unwrap_or_else(|| perpendicular_to(&self.up));
        on_axis + direction * self.radius
    }

    /// Sphere enclosing both caps
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.height * 0.5)
    }
}

fn perpendicular_to(axis: &Vec3) -> Vec3 {
    let candidate = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::z() };
    axis.cross(&candidate).try_normalize(EPSILON).unwrap_or_else(Vec3::y)
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space box
    Box(WorldBox),
    /// World-space sphere
    Sphere(BoundingSphere),
    /// World-space capsule
    Capsule(WorldCapsule),
}

impl WorldSpaceShape {
    /// Get center position
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Box(cuboid) => cuboid.center,
            Self::Sphere(sphere) => sphere.center,
            Self::Capsule(capsule) => capsule.center,
        }
    }

    /// Conservative bounding sphere
    pub fn bounding_sphere(&self) -> BoundingSphere {
        match self {
            Self::Box(cuboid) => cuboid.bounding_sphere(),
            Self::Sphere(sphere) => *sphere,
            Self::Capsule(capsule) => capsule.bounding_sphere(),
        }
    }

    /// Whether every coordinate and radius is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Box(cuboid) => utils::is_finite(&cuboid.center) && utils::is_finite(&cuboid.half_extents),
            Self::Sphere(sphere) => utils::is_finite(&sphere.center) && sphere.radius.is_finite(),
            Self::Capsule(capsule) => {
                utils::is_finite(&capsule.center)
                    && utils::is_finite(&capsule.up)
                    && capsule.height.is_finite()
                    && capsule.radius.is_finite()
            }
        }
    }

    /// Exact point containment (boundary included)
    pub fn contains_point(&self, point: &Vec3) -> bool {
        match self {
            Self::Box(cuboid) => cuboid.contains_point(point),
            Self::Sphere(sphere) => sphere.contains_point(point),
            Self::Capsule(capsule) => capsule.contains_point(point),
        }
    }

    /// Closest point inside the shape (the point itself when contained)
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        match self {
            Self::Box(cuboid) => cuboid.closest_point(point),
            Self::Sphere(sphere) => {
                let offset = point - sphere.center;
                let distance = offset.magnitude();
                if distance <= sphere.radius {
                    *point
                } else {
                    sphere.center + offset * (sphere.radius / distance)
                }
            }
            Self::Capsule(capsule) => capsule.closest_point(point),
        }
    }

    /// Closest point on the shape's surface
    pub fn closest_point_on_surface(&self, point: &Vec3) -> Vec3 {
        match self {
            Self::Box(cuboid) => cuboid.closest_point_on_surface(point),
            Self::Sphere(sphere) => {
                let direction = (point - sphere.center).try_normalize(EPSILON).unwrap_or_else(Vec3::y);
                sphere.center + direction * sphere.radius
            }
            Self::Capsule(capsule) => capsule.closest_point_on_surface(point),
        }
    }

    /// Exact ray test
    ///
    /// Returns the linear distance to the entry point, or to the exit point
    /// when the origin is inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if ray.direction.magnitude_squared() <= EPSILON {
            return self.contains_point(&ray.origin).then_some(0.0);
        }

        match self {
            Self::Box(cuboid) => narrow_phase::ray_box(ray, cuboid),
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
            Self::Capsule(capsule) => narrow_phase::ray_capsule(ray, capsule),
        }
    }

    /// Exact pairwise test, symmetric in its arguments
    ///
    /// Degenerate (non-finite) geometry is reported as no collision.
    pub fn intersects(&self, other: &WorldSpaceShape) -> bool {
        if !self.is_finite() || !other.is_finite() {
            log::warn!(
                "collisions between degenerate shapes are not supported: {:?} vs {:?}",
                self,
                other
            );
            return false;
        }

        match (self, other) {
            (Self::Box(a), Self::Box(b)) => narrow_phase::box_box(a, b),

            (Self::Box(cuboid), Self::Sphere(sphere)) | (Self::Sphere(sphere), Self::Box(cuboid)) => {
                narrow_phase::box_sphere(cuboid, sphere)
            }

            (Self::Box(cuboid), Self::Capsule(capsule)) | (Self::Capsule(capsule), Self::Box(cuboid)) => {
                narrow_phase::box_capsule(cuboid, capsule)
            }

            (Self::Sphere(a), Self::Sphere(b)) => a.intersects(b),

            (Self::Sphere(sphere), Self::Capsule(capsule)) | (Self::Capsule(capsule), Self::Sphere(sphere)) => {
                narrow_phase::sphere_capsule(sphere, capsule)
            }

            (Self::Capsule(a), Self::Capsule(b)) => narrow_phase::capsule_capsule(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constructors_reject_bad_parameters() {
        assert!(ColliderShape::cuboid(Vec3::zeros(), Vec3::new(-1.0, 1.0, 1.0)).is_err());
        assert!(ColliderShape::sphere(Vec3::zeros(), f32::NAN).is_err());
        assert!(ColliderShape::capsule(Vec3::zeros(), Vec3::zeros(), 2.0, 0.5).is_err());
        assert!(ColliderShape::sphere(Vec3::new(f32::INFINITY, 0.0, 0.0), 1.0).is_err());
    }

    #[test]
    fn test_capsule_height_is_clamped_and_axis_normalized() {
        let shape = ColliderShape::capsule(Vec3::zeros(), Vec3::new(0.0, 3.0, 0.0), 0.5, 1.0).unwrap();
        match shape {
            ColliderShape::Capsule { up, height, .. } => {
                assert_relative_eq!(up, Vec3::new(0.0, 1.0, 0.0));
                assert_relative_eq!(height, 2.0);
            }
            _ => panic!("expected capsule"),
        }
    }

    #[test]
    fn test_local_bounds_per_shape() {
        let cuboid = ColliderShape::cuboid(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0)).unwrap();
        assert_relative_eq!(cuboid.local_bounds().sphere_radius, 3.0_f32.sqrt());

        let sphere = ColliderShape::sphere(Vec3::zeros(), 1.5).unwrap();
        assert_relative_eq!(sphere.local_bounds().size, Vec3::repeat(3.0));

        let capsule = ColliderShape::capsule(Vec3::zeros(), Vec3::y(), 4.0, 0.5).unwrap();
        let bounds = capsule.local_bounds();
        assert_relative_eq!(bounds.size, Vec3::new(1.0, 4.0, 1.0));
        assert_relative_eq!(bounds.sphere_radius, 2.0);
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let shape = ColliderShape::cuboid(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let transform = Transform::new(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::identity(),
            Vec3::new(2.0, -1.0, 1.0),
        );

        let bounds = shape.world_bounds(&transform);
        assert_relative_eq!(bounds.center, Vec3::new(2.0, 5.0, 0.0));
        assert_relative_eq!(bounds.size, Vec3::new(2.0, 2.0, 3.0));
        assert_relative_eq!(bounds.sphere_radius, (Vec3::new(0.5, 1.0, 1.5)).magnitude() * 2.0);
    }

    #[test]
    fn test_capsule_axis_follows_rotation_and_radius_scales() {
        let shape = ColliderShape::capsule(Vec3::zeros(), Vec3::y(), 4.0, 0.5).unwrap();
        let transform = Transform::new(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::z_axis(), -std::f32::consts::FRAC_PI_2),
            Vec3::repeat(2.0),
        );

        match shape.to_world_space(&transform) {
            WorldSpaceShape::Capsule(capsule) => {
                assert_relative_eq!(capsule.up, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
                assert_relative_eq!(capsule.radius, 1.0);
                assert_relative_eq!(capsule.height, 8.0);
                assert_relative_eq!(capsule.half_segment(), 3.0);
            }
            other => panic!("expected capsule, got {other:?}"),
        }
    }

    #[test]
    fn test_capsule_radius_ignores_stretch_along_axis() {
        let shape = ColliderShape::capsule(Vec3::zeros(), Vec3::y(), 2.0, 0.5).unwrap();
        let transform = Transform::new(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 3.0, 1.0));

        match shape.to_world_space(&transform) {
            WorldSpaceShape::Capsule(capsule) => {
                assert_relative_eq!(capsule.radius, 0.5);
                assert_relative_eq!(capsule.height, 6.0);
            }
            other => panic!("expected capsule, got {other:?}"),
        }

        let sideways = ColliderShape::capsule(Vec3::zeros(), Vec3::x(), 2.0, 0.5).unwrap();
        match sideways.to_world_space(&Transform::new(Vec3::zeros(), Quat::identity(), Vec3::new(1.0, 3.0, 2.0))) {
            WorldSpaceShape::Capsule(capsule) => assert_relative_eq!(capsule.radius, 1.5, epsilon = 1e-5),
            other => panic!("expected capsule, got {other:?}"),
        }
    }

    #[test]
    fn test_box_surface_snaps_interior_points_to_nearest_face() {
        let cuboid = WorldBox::new(Vec3::zeros(), Vec3::repeat(1.0));

        assert_relative_eq!(
            cuboid.closest_point_on_surface(&Vec3::new(0.2, 0.9, 0.0)),
            Vec3::new(0.2, 1.0, 0.0)
        );
        assert_relative_eq!(
            cuboid.closest_point_on_surface(&Vec3::new(3.0, 0.0, 0.0)),
            Vec3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_sphere_closest_points() {
        let sphere = WorldSpaceShape::Sphere(BoundingSphere::new(Vec3::zeros(), 2.0));

        assert_relative_eq!(sphere.closest_point(&Vec3::new(0.5, 0.0, 0.0)), Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(sphere.closest_point(&Vec3::new(4.0, 0.0, 0.0)), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(
            sphere.closest_point_on_surface(&Vec3::new(0.5, 0.0, 0.0)),
            Vec3::new(2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_capsule_surface_point_on_axis_uses_perpendicular() {
        let capsule = WorldCapsule::new(Vec3::zeros(), Vec3::y(), 4.0, 1.0);
        let surface = capsule.closest_point_on_surface(&Vec3::zeros());

        assert_relative_eq!(surface.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(surface.dot(&Vec3::y()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_pair_reports_no_collision() {
        crate::foundation::logging::init_for_tests();
        let good = WorldSpaceShape::Sphere(BoundingSphere::new(Vec3::zeros(), 1.0));
        let bad = WorldSpaceShape::Sphere(BoundingSphere::new(Vec3::new(f32::NAN, 0.0, 0.0), 1.0));

        assert!(!good.intersects(&bad));
        assert!(!bad.intersects(&good));
    }
}
