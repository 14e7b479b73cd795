//! Collider component
//!
//! A collider pairs a model-space [`ColliderShape`] with the entity that owns
//! it. Every query re-reads the owner's global transform from the scene, so
//! results always reflect where the entity is right now.

use super::collision::{Bounds, ColliderShape, Ray, WorldSpaceShape};
use crate::ecs::{Component, Entity, SceneAccess};
use crate::foundation::math::{Transform, Vec3};

/// Box, sphere or capsule attached to an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    owner: Option<Entity>,
    shape: ColliderShape,
    enabled: bool,
}

impl Collider {
    /// Create a collider owned by `owner`
    pub fn new(owner: Entity, shape: ColliderShape) -> Self {
        Self {
            owner: Some(owner),
            shape,
            enabled: true,
        }
    }

    /// Create an ownerless probe evaluated under the identity transform
    pub fn probe(shape: ColliderShape) -> Self {
        Self {
            owner: None,
            shape,
            enabled: true,
        }
    }

    /// Model-space shape
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Owner's current global transform (identity for probes)
    pub fn global_transform<S: SceneAccess + ?Sized>(&self, scene: &S) -> Transform {
        self.owner
            .and_then(|owner| scene.global_transform(owner))
            .unwrap_or_default()
    }

    /// Shape in world space under the owner's current transform
    pub fn world_shape<S: SceneAccess + ?Sized>(&self, scene: &S) -> WorldSpaceShape {
        self.shape.to_world_space(&self.global_transform(scene))
    }

    /// World-space bounds, recomputed on every call
    pub fn bounds<S: SceneAccess + ?Sized>(&self, scene: &S) -> Bounds {
        self.shape.world_bounds(&self.global_transform(scene))
    }

    /// Exact point containment
    pub fn check_point<S: SceneAccess + ?Sized>(&self, scene: &S, point: &Vec3) -> bool {
        if !self.check_point_coarse(scene, point) {
            return false;
        }
        self.world_shape(scene).contains_point(point)
    }

    /// Point against the bounding sphere
    pub fn check_point_coarse<S: SceneAccess + ?Sized>(&self, scene: &S, point: &Vec3) -> bool {
        self.bounds(scene).bounding_sphere().contains_point(point)
    }

    /// Whether the ray hits the collider
    pub fn check_ray<S: SceneAccess + ?Sized>(&self, scene: &S, ray: &Ray) -> bool {
        self.check_ray_distance(scene, ray).is_some()
    }

    /// Squared distance from the ray origin to the entry point
    ///
    /// The exit point is used when the origin is inside the collider.
    pub fn check_ray_distance<S: SceneAccess + ?Sized>(&self, scene: &S, ray: &Ray) -> Option<f32> {
        if !self.bounds(scene).bounding_sphere().intersects_ray(ray) {
            return None;
        }
        self.world_shape(scene)
            .intersect_ray(ray)
            .map(|distance| distance * distance)
    }

    /// Exact test against another collider
    pub fn check<S: SceneAccess + ?Sized>(&self, scene: &S, other: &Collider) -> bool {
        self.world_shape(scene).intersects(&other.world_shape(scene))
    }

    /// Bounding spheres against each other
    pub fn check_coarse<S: SceneAccess + ?Sized>(&self, scene: &S, other: &Collider) -> bool {
        self.bounds(scene)
            .bounding_sphere()
            .intersects(&other.bounds(scene).bounding_sphere())
    }

    /// Closest point inside the collider
    pub fn closest_point<S: SceneAccess + ?Sized>(&self, scene: &S, point: &Vec3) -> Vec3 {
        self.world_shape(scene).closest_point(point)
    }

    /// Closest point on the collider's surface
    pub fn closest_point_on_surface<S: SceneAccess + ?Sized>(&self, scene: &S, point: &Vec3) -> Vec3 {
        self.world_shape(scene).closest_point_on_surface(point)
    }

    /// World-space capsule axis, `None` for other shapes
    pub fn up_direction<S: SceneAccess + ?Sized>(&self, scene: &S) -> Option<Vec3> {
        match self.world_shape(scene) {
            WorldSpaceShape::Capsule(capsule) => Some(capsule.up),
            _ => None,
        }
    }

    /// World-space capsule height, `None` for other shapes
    pub fn height<S: SceneAccess + ?Sized>(&self, scene: &S) -> Option<f32> {
        match self.world_shape(scene) {
            WorldSpaceShape::Capsule(capsule) => Some(capsule.height),
            _ => None,
        }
    }

    /// World-space sphere or capsule radius, `None` for boxes
    pub fn radius<S: SceneAccess + ?Sized>(&self, scene: &S) -> Option<f32> {
        match self.world_shape(scene) {
            WorldSpaceShape::Sphere(sphere) => Some(sphere.radius),
            WorldSpaceShape::Capsule(capsule) => Some(capsule.radius),
            WorldSpaceShape::Box(_) => None,
        }
    }
}

impl Component for Collider {
    fn owner(&self) -> Option<Entity> {
        self.owner
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_active(&mut self, active: bool) {
        self.enabled = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::ecs::World;
    use approx::assert_relative_eq;

    fn scene_with_entity_at(position: Vec3) -> (World, Entity) {
        let mut world = World::new();
        let entity = world.create_entity(TransformComponent::from_position(position));
        (world, entity)
    }

    #[test]
    fn test_bounds_track_owner_each_call() {
        let (mut world, entity) = scene_with_entity_at(Vec3::zeros());
        let collider = Collider::new(
            entity,
            ColliderShape::cuboid(Vec3::zeros(), Vec3::repeat(2.0)).unwrap(),
        );

        assert_relative_eq!(collider.bounds(&world).center, Vec3::zeros());
        world.set_position(entity, Vec3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(collider.bounds(&world).center, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_check_point_exact_versus_coarse() {
        let (world, entity) = scene_with_entity_at(Vec3::zeros());
        let collider = Collider::new(
            entity,
            ColliderShape::cuboid(Vec3::zeros(), Vec3::repeat(2.0)).unwrap(),
        );
        // Inside the bounding sphere but outside the box
        let corner_gap = Vec3::new(1.2, 1.2, 0.0);

        assert!(collider.check_point_coarse(&world, &corner_gap));
        assert!(!collider.check_point(&world, &corner_gap));
        assert!(collider.check_point(&world, &Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_sphere_ray_distance_is_squared() {
        let (world, entity) = scene_with_entity_at(Vec3::new(0.0, 0.0, 10.0));
        let collider = Collider::new(entity, ColliderShape::sphere(Vec3::zeros(), 2.0).unwrap());
        let ray = Ray::new(Vec3::zeros(), Vec3::z());

        assert_relative_eq!(collider.check_ray_distance(&world, &ray).unwrap(), 64.0, epsilon = 1e-3);
        assert!(!collider.check_ray(&world, &Ray::new(Vec3::zeros(), Vec3::x())));
    }

    #[test]
    fn test_probe_uses_identity_transform() {
        let probe = Collider::probe(ColliderShape::sphere(Vec3::new(1.0, 2.0, 3.0), 1.0).unwrap());
        let world = World::new();

        assert_eq!(probe.owner(), None);
        assert!(probe.is_active(&world));
        assert_relative_eq!(probe.bounds(&world).center, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_capsule_accessors_in_world_space() {
        let mut world = World::new();
        let entity = world.create_entity(TransformComponent::identity().with_uniform_scale(2.0));
        let collider = Collider::new(
            entity,
            ColliderShape::capsule(Vec3::zeros(), Vec3::y(), 3.0, 0.5).unwrap(),
        );

        assert_relative_eq!(collider.height(&world).unwrap(), 6.0);
        assert_relative_eq!(collider.radius(&world).unwrap(), 1.0);
        assert_relative_eq!(collider.up_direction(&world).unwrap(), Vec3::y());
    }

    #[test]
    fn test_inactive_owner_deactivates_collider() {
        let (mut world, entity) = scene_with_entity_at(Vec3::zeros());
        let mut collider = Collider::new(entity, ColliderShape::sphere(Vec3::zeros(), 1.0).unwrap());

        assert!(collider.is_active(&world));
        world.set_active(entity, false);
        assert!(!collider.is_active(&world));

        world.set_active(entity, true);
        collider.set_active(false);
        assert!(!collider.is_active(&world));
    }
}
