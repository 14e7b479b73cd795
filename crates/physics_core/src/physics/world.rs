//! Physics world
//!
//! Owns the collider registry, the rigidbodies and the world-wide
//! configuration. Gameplay code creates colliders and bodies through it and
//! runs every query against it; the scene is passed in by reference to each
//! call that needs transforms.

use super::collider::Collider;
use super::collision::{Bounds, ColliderShape, Ray, RaycastHit};
use super::error::{PhysicsError, PhysicsResult};
use super::registry::{ColliderHandle, ColliderRegistry};
use super::rigidbody::{ForceMode, Rigidbody};
use super::{overlap, raycast};
use crate::config::{Config, ConfigError, PhysicsConfig};
use crate::ecs::{Component, Entity, SceneAccess};
use crate::foundation::collections::{new_key_type, OrderedSlotMap};
use crate::foundation::math::Vec3;

new_key_type! {
    /// Stable identity of a rigidbody
    pub struct RigidbodyHandle;
}

/// Colliders, rigidbodies and physics settings of one scene
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    pub(super) config: PhysicsConfig,
    pub(super) colliders: ColliderRegistry,
    pub(super) rigidbodies: OrderedSlotMap<RigidbodyHandle, Rigidbody>,
}

impl PhysicsWorld {
    /// Create an empty world with the given settings
    pub fn new(config: PhysicsConfig) -> Self {
        if let Err(error) = config.validate() {
            log::warn!("Physics world created with questionable settings: {}", error);
        }
        Self {
            config,
            colliders: ColliderRegistry::new(),
            rigidbodies: OrderedSlotMap::new(),
        }
    }

    /// Create an empty world with settings loaded from a TOML or RON file
    pub fn from_config_file(path: &str) -> Result<Self, ConfigError> {
        let config = PhysicsConfig::load_from_file(path)?;
        config.validate()?;
        log::info!("Loaded physics settings from {}", path);
        Ok(Self::new(config))
    }

    /// World-wide settings
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Mutable world-wide settings
    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    // ---- Colliders ----------------------------------------------------

    /// Attach a box collider to `owner`
    pub fn add_box_collider(&mut self, owner: Entity, center: Vec3, size: Vec3) -> PhysicsResult<ColliderHandle> {
        let shape = ColliderShape::cuboid(center, size)?;
        Ok(self.add_collider(Collider::new(owner, shape)))
    }

    /// Attach a sphere collider to `owner`
    pub fn add_sphere_collider(&mut self, owner: Entity, center: Vec3, radius: f32) -> PhysicsResult<ColliderHandle> {
        let shape = ColliderShape::sphere(center, radius)?;
        Ok(self.add_collider(Collider::new(owner, shape)))
    }

    /// Attach a capsule collider to `owner`
    pub fn add_capsule_collider(
        &mut self,
        owner: Entity,
        center: Vec3,
        up: Vec3,
        height: f32,
        radius: f32,
    ) -> PhysicsResult<ColliderHandle> {
        let shape = ColliderShape::capsule(center, up, height, radius)?;
        Ok(self.add_collider(Collider::new(owner, shape)))
    }

    /// Register an already built collider
    pub fn add_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.colliders.insert(collider)
    }

    /// Release a collider
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> PhysicsResult<Collider> {
        self.colliders.remove(handle)
    }

    /// Look up a collider
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Look up a collider mutably
    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Snapshot of every live collider in registration order
    pub fn colliders(&self) -> Vec<ColliderHandle> {
        self.colliders.handles()
    }

    /// Colliders owned by `entity`, in registration order
    pub fn colliders_of(&self, entity: Entity) -> Vec<ColliderHandle> {
        self.colliders.owned_by(entity)
    }

    /// Check that the collider registry is internally consistent
    pub fn verify_registry(&self) -> PhysicsResult<()> {
        self.colliders.verify()
    }

    fn live_collider(&self, handle: ColliderHandle) -> PhysicsResult<&Collider> {
        self.colliders
            .get(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))
    }

    /// World-space bounds of a collider
    pub fn bounds<S: SceneAccess + ?Sized>(&self, scene: &S, handle: ColliderHandle) -> PhysicsResult<Bounds> {
        Ok(self.live_collider(handle)?.bounds(scene))
    }

    /// Whether the collider contains `point`
    pub fn check_point<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        handle: ColliderHandle,
        point: &Vec3,
    ) -> PhysicsResult<bool> {
        Ok(self.live_collider(handle)?.check_point(scene, point))
    }

    /// Whether the ray hits the collider
    pub fn check_ray<S: SceneAccess + ?Sized>(&self, scene: &S, handle: ColliderHandle, ray: &Ray) -> PhysicsResult<bool> {
        Ok(self.live_collider(handle)?.check_ray(scene, ray))
    }

    /// Squared distance from the ray origin to where it enters the collider
    pub fn check_ray_distance<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        handle: ColliderHandle,
        ray: &Ray,
    ) -> PhysicsResult<Option<f32>> {
        Ok(self.live_collider(handle)?.check_ray_distance(scene, ray))
    }

    /// Exact test between two colliders
    pub fn check<S: SceneAccess + ?Sized>(&self, scene: &S, a: ColliderHandle, b: ColliderHandle) -> PhysicsResult<bool> {
        let first = self.live_collider(a)?;
        let second = self.live_collider(b)?;
        Ok(first.check(scene, second))
    }

    /// Closest point inside the collider
    pub fn closest_point<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        handle: ColliderHandle,
        point: &Vec3,
    ) -> PhysicsResult<Vec3> {
        Ok(self.live_collider(handle)?.closest_point(scene, point))
    }

    /// Closest point on the collider's surface
    pub fn closest_point_on_surface<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        handle: ColliderHandle,
        point: &Vec3,
    ) -> PhysicsResult<Vec3> {
        Ok(self.live_collider(handle)?.closest_point_on_surface(scene, point))
    }

    // ---- Queries ------------------------------------------------------

    /// Whether any active collider is hit within `max_distance`
    pub fn raycast<S: SceneAccess + ?Sized>(&self, scene: &S, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        self.raycast_hit(scene, origin, direction, max_distance).is_hit()
    }

    /// Nearest hit within `max_distance`
    pub fn raycast_hit<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> RaycastHit {
        raycast::cast(&self.colliders, scene, origin, direction, max_distance)
    }

    /// Nearest hit at any distance
    pub fn raycast_unbounded<S: SceneAccess + ?Sized>(&self, scene: &S, origin: Vec3, direction: Vec3) -> RaycastHit {
        self.raycast_hit(scene, origin, direction, f32::INFINITY)
    }

    /// Active colliders touching an axis-aligned box region
    pub fn overlap_box<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        center: Vec3,
        size: Vec3,
    ) -> PhysicsResult<Vec<ColliderHandle>> {
        let probe = Collider::probe(ColliderShape::cuboid(center, size)?);
        Ok(overlap::overlapping(&self.colliders, scene, &probe))
    }

    /// Active colliders touching a spherical region
    pub fn overlap_sphere<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        center: Vec3,
        radius: f32,
    ) -> PhysicsResult<Vec<ColliderHandle>> {
        let probe = Collider::probe(ColliderShape::sphere(center, radius)?);
        Ok(overlap::overlapping(&self.colliders, scene, &probe))
    }

    /// Active colliders touching a capsule region
    pub fn overlap_capsule<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        center: Vec3,
        up: Vec3,
        height: f32,
        radius: f32,
    ) -> PhysicsResult<Vec<ColliderHandle>> {
        let probe = Collider::probe(ColliderShape::capsule(center, up, height, radius)?);
        Ok(overlap::overlapping(&self.colliders, scene, &probe))
    }

    // ---- Rigidbodies --------------------------------------------------

    /// Attach a default rigidbody to `owner`, using the world's sleep threshold
    pub fn create_rigidbody(&mut self, owner: Entity) -> RigidbodyHandle {
        let mut body = Rigidbody::new(owner);
        body.sleep_threshold = self.config.default_sleep_threshold;
        self.add_rigidbody(body)
    }

    /// Attach a rigidbody to its entity
    ///
    /// An entity owns at most one rigidbody; a previous one is released.
    pub fn add_rigidbody(&mut self, rigidbody: Rigidbody) -> RigidbodyHandle {
        let owner = rigidbody.entity();
        if let Some(previous) = self.rigidbody_of(owner) {
            log::warn!("{} already has a rigidbody, replacing it", owner);
            self.rigidbodies.remove(previous);
        }
        let handle = self.rigidbodies.insert(rigidbody);
        log::debug!("Added rigidbody {:?} to {}", handle, owner);
        handle
    }

    /// Release a rigidbody
    pub fn remove_rigidbody(&mut self, handle: RigidbodyHandle) -> Option<Rigidbody> {
        self.rigidbodies.remove(handle)
    }

    /// Look up a rigidbody
    pub fn rigidbody(&self, handle: RigidbodyHandle) -> Option<&Rigidbody> {
        self.rigidbodies.get(handle)
    }

    /// Look up a rigidbody mutably
    pub fn rigidbody_mut(&mut self, handle: RigidbodyHandle) -> Option<&mut Rigidbody> {
        self.rigidbodies.get_mut(handle)
    }

    /// The rigidbody owned by `entity`
    pub fn rigidbody_of(&self, entity: Entity) -> Option<RigidbodyHandle> {
        self.rigidbodies
            .iter()
            .find(|(_, body)| body.entity() == entity)
            .map(|(handle, _)| handle)
    }

    /// Every rigidbody in creation order
    pub fn rigidbodies(&self) -> Vec<RigidbodyHandle> {
        self.rigidbodies.keys().collect()
    }

    /// Apply a force to a rigidbody
    ///
    /// Ignored when the body or its entity is inactive, or the body is
    /// kinematic.
    pub fn add_force<S: SceneAccess + ?Sized>(
        &mut self,
        scene: &S,
        handle: RigidbodyHandle,
        force: Vec3,
        mode: ForceMode,
        delta_time: f32,
    ) {
        if let Some(body) = self.rigidbodies.get_mut(handle) {
            if body.is_active(scene) {
                body.add_force(force, mode, delta_time);
            }
        }
    }

    /// Release every physics component owned by `entity`
    ///
    /// Returns how many components were released.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let mut released = 0;
        for handle in self.colliders.owned_by(entity) {
            match self.colliders.remove(handle) {
                Ok(_) => released += 1,
                Err(error) => log::error!("Failed to release collider of {}: {}", entity, error),
            }
        }
        if let Some(handle) = self.rigidbody_of(entity) {
            self.rigidbodies.remove(handle);
            released += 1;
        }
        if released > 0 {
            log::debug!("Released {} physics components of {}", released, entity);
        }
        released
    }
}
