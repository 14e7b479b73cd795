//! Rigidbody integration and contact resolution
//!
//! Each tick a body picks up gravity, may fall asleep or wake up, and moves
//! by its dragged velocity. While moving it is tested against every other
//! active collider in registration order; contacts exchange velocity with
//! the other body along an axis-aligned normal and apply friction along the
//! remaining axes.

use super::collision::Bounds;
use super::registry::ColliderHandle;
use super::rigidbody::{CollisionDetectionMode, ForceMode};
use super::world::{PhysicsWorld, RigidbodyHandle};
use crate::ecs::{Component, Entity, SceneAccess, SceneAccessMut};
use crate::foundation::math::{utils, Vec3};
use std::collections::HashSet;

/// Collider pair already resolved during one move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ContactPair {
    own: ColliderHandle,
    other: ColliderHandle,
}

impl PhysicsWorld {
    /// Simulate every rigidbody once, in creation order
    pub fn step<S: SceneAccessMut + ?Sized>(&mut self, scene: &mut S, delta_time: f32) {
        let bodies: Vec<RigidbodyHandle> = self.rigidbodies.keys().collect();
        for handle in bodies {
            self.simulate(scene, handle, delta_time);
        }
    }

    /// Simulate one rigidbody for one tick
    pub fn simulate<S: SceneAccessMut + ?Sized>(&mut self, scene: &mut S, handle: RigidbodyHandle, delta_time: f32) {
        let gravity = self.config.gravity;
        let Some(body) = self.rigidbodies.get_mut(handle) else {
            return;
        };

        if !body.is_active(&*scene) {
            return;
        }

        if body.is_kinematic {
            scene.translate(body.entity(), body.velocity * delta_time);
            return;
        }

        if body.use_gravity {
            body.add_force(gravity, ForceMode::Acceleration, delta_time);
        }

        if body.is_sleeping() {
            if body.velocity.magnitude_squared() >= body.sleep_threshold {
                body.wake_up();
            }
            return;
        }

        if utils::float_equals(body.dragged_velocity(delta_time).magnitude_squared(), 0.0) {
            return;
        }

        self.move_body(scene, handle, delta_time);
    }

    fn move_body<S: SceneAccessMut + ?Sized>(&mut self, scene: &mut S, handle: RigidbodyHandle, delta_time: f32) {
        let Some(body) = self.rigidbodies.get(handle) else {
            return;
        };
        let owner = body.entity();
        let mode = body.collision_detection_mode;
        let own_colliders = self.colliders.owned_by(owner);

        let steps = match mode {
            CollisionDetectionMode::None => 0,
            CollisionDetectionMode::Discrete => 1,
            CollisionDetectionMode::Continuous => u32::from(self.config.continuous_collision_steps.max(1)),
        };

        if steps == 0 || own_colliders.is_empty() {
            scene.translate(owner, body.dragged_velocity(delta_time) * delta_time);
            return;
        }

        self.sweep(scene, handle, owner, &own_colliders, steps, delta_time);

        if let Some(body) = self.rigidbodies.get_mut(handle) {
            let threshold = body.sleep_threshold;
            if body.dragged_velocity(delta_time).magnitude_squared() < threshold * threshold {
                body.sleep();
            }
        }
    }

    /// Move in `steps` equal sub-steps, resolving each overlapping pair once
    fn sweep<S: SceneAccessMut + ?Sized>(
        &mut self,
        scene: &mut S,
        handle: RigidbodyHandle,
        owner: Entity,
        own_colliders: &[ColliderHandle],
        steps: u32,
        delta_time: f32,
    ) {
        let world_colliders = self.colliders.handles();
        let mut checked: HashSet<ContactPair> = HashSet::new();

        for _ in 0..steps {
            let velocity = self.dragged_velocity_of(handle, delta_time);

            for &own in own_colliders {
                for &other in &world_colliders {
                    let pair = ContactPair { own, other };
                    if checked.contains(&pair) {
                        continue;
                    }

                    if let Some((normal, other_owner)) = self.find_contact(&*scene, owner, pair) {
                        self.resolve_contact(&*scene, handle, other_owner, normal, velocity, delta_time);
                        checked.insert(pair);
                    }
                }
            }

            let step = self.dragged_velocity_of(handle, delta_time) * delta_time / steps as f32;
            scene.translate(owner, step);
        }
    }

    fn dragged_velocity_of(&self, handle: RigidbodyHandle, delta_time: f32) -> Vec3 {
        self.rigidbodies
            .get(handle)
            .map_or_else(Vec3::zeros, |body| body.dragged_velocity(delta_time))
    }

    /// Contact normal and other owner when the pair overlaps
    fn find_contact<S: SceneAccess + ?Sized>(
        &self,
        scene: &S,
        owner: Entity,
        pair: ContactPair,
    ) -> Option<(Vec3, Option<Entity>)> {
        let own = self.colliders.get(pair.own)?;
        let other = self.colliders.get(pair.other)?;

        if other.owner() == Some(owner) || !own.is_active(scene) || !other.is_active(scene) {
            return None;
        }
        if !own.check(scene, other) {
            return None;
        }

        let normal = contact_normal(&own.bounds(scene), &other.bounds(scene));
        Some((normal, other.owner()))
    }

    fn resolve_contact<S: SceneAccess + ?Sized>(
        &mut self,
        scene: &S,
        handle: RigidbodyHandle,
        other_owner: Option<Entity>,
        normal: Vec3,
        velocity: Vec3,
        delta_time: f32,
    ) {
        let normal_mask = normal.map(|component| if component.abs() > 0.0 { component.signum() } else { 0.0 });
        let friction_mask = normal_mask.map(|component| if component == 0.0 { 1.0 } else { 0.0 });
        let moving_into_contact = normal.dot(&-velocity) >= 0.0;

        let other_handle = other_owner
            .and_then(|entity| self.rigidbody_of(entity))
            .filter(|other| *other != handle)
            .filter(|other| self.rigidbodies.get(*other).is_some_and(|body| body.is_active(scene)));

        let Some(mass) = self.rigidbodies.get(handle).map(|body| body.mass) else {
            return;
        };

        if let Some(other_handle) = other_handle {
            let Some((other_velocity, other_mass, other_kinematic)) = self
                .rigidbodies
                .get(other_handle)
                .map(|other| (other.dragged_velocity(delta_time), other.mass, other.is_kinematic))
            else {
                return;
            };
            let other_moving_into_contact = normal.dot(&other_velocity) >= 0.0;

            if !other_kinematic {
                if let Some(other) = self.rigidbodies.get_mut(other_handle) {
                    if other_moving_into_contact {
                        let change = other_velocity.component_mul(&normal_mask).magnitude();
                        other.add_force(-normal * change, ForceMode::VelocityChange, delta_time);
                    }
                    if moving_into_contact {
                        let impulse = (velocity * mass).component_mul(&normal_mask).magnitude();
                        other.add_force(-normal * impulse, ForceMode::Impulse, delta_time);
                    }
                }
            }

            if let Some(body) = self.rigidbodies.get_mut(handle) {
                if moving_into_contact {
                    let change = velocity.component_mul(&normal_mask).magnitude();
                    body.add_force(normal * change, ForceMode::VelocityChange, delta_time);
                }
                if other_moving_into_contact {
                    let impulse = (other_velocity * other_mass).component_mul(&normal_mask).magnitude();
                    body.add_force(normal * impulse, ForceMode::Impulse, delta_time);
                }
            }
        } else if moving_into_contact {
            if let Some(body) = self.rigidbodies.get_mut(handle) {
                let change = velocity.component_mul(&normal_mask).magnitude();
                body.add_force(normal * change, ForceMode::VelocityChange, delta_time);
            }
        }

        let friction = self.friction_factor(delta_time);
        if let Some(body) = self.rigidbodies.get_mut(handle) {
            let tangential = velocity.component_mul(&friction_mask);
            body.add_force(-tangential * friction, ForceMode::Acceleration, delta_time);
        }
    }

    /// Friction deceleration per unit of tangential speed, capped so one tick
    /// can at most stop the tangential motion
    fn friction_factor(&self, delta_time: f32) -> f32 {
        let factor = self.config.friction * self.config.gravity.magnitude();
        if delta_time > 0.0 {
            factor.min(1.0 / delta_time)
        } else {
            factor
        }
    }
}

/// Axis-aligned normal of the face of `other` nearest to `own`'s center
///
/// The center is snapped onto each pair of opposite faces of the other box;
/// the nearest snap wins (ties go to x, then y, then z) and the normal points
/// away from the other box's center.
pub fn contact_normal(own: &Bounds, other: &Bounds) -> Vec3 {
    let center = own.center;
    let (min, max) = (other.min(), other.max());

    let mut best_axis = 0;
    let mut best_distance = f32::INFINITY;
    let mut best_snapped = 0.0;
    for axis in 0..3 {
        let snapped = utils::snap(center[axis], min[axis], max[axis]);
        let distance = (snapped - center[axis]).abs();
        if distance < best_distance {
            best_axis = axis;
            best_distance = distance;
            best_snapped = snapped;
        }
    }

    let mut normal = Vec3::zeros();
    normal[best_axis] = utils::sign(best_snapped - other.center[best_axis]);
    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::ecs::components::TransformComponent;
    use crate::ecs::World;
    use crate::physics::rigidbody::Rigidbody;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_contact_normal_picks_nearest_face() {
        let floor = Bounds::new(Vec3::zeros(), Vec3::new(10.0, 1.0, 10.0), 1.0);
        let above = Bounds::new(Vec3::new(2.0, 0.9, 1.0), Vec3::repeat(1.0), 1.0);
        let beside = Bounds::new(Vec3::new(-4.9, 0.0, 0.0), Vec3::repeat(1.0), 1.0);

        assert_eq!(contact_normal(&above, &floor), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(contact_normal(&beside, &floor), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_body_without_colliders_moves_freely() {
        let mut scene = World::new();
        let entity = scene.create_entity(TransformComponent::identity());
        let mut physics = PhysicsWorld::new(PhysicsConfig::default().with_gravity(Vec3::zeros()));
        physics.add_rigidbody(Rigidbody::new(entity).with_velocity(Vec3::new(6.0, 0.0, 0.0)));

        physics.step(&mut scene, 0.5);
        assert_relative_eq!(scene.global_position(entity).unwrap(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_static_wall_cancels_normal_velocity() {
        let mut scene = World::new();
        let wall = scene.create_entity(TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let ball = scene.create_entity(TransformComponent::identity());

        let mut physics = PhysicsWorld::new(PhysicsConfig::default().with_gravity(Vec3::zeros()));
        physics.add_box_collider(wall, Vec3::zeros(), Vec3::new(1.0, 10.0, 10.0)).unwrap();
        physics.add_sphere_collider(ball, Vec3::zeros(), 0.6).unwrap();
        let body = physics.add_rigidbody(Rigidbody::new(ball).with_velocity(Vec3::new(2.0, 0.0, 0.5)));

        physics.simulate(&mut scene, body, DT);

        let velocity = physics.rigidbody(body).unwrap().velocity;
        assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-6);
        // Friction is zero without gravity
        assert_relative_eq!(velocity.z, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_friction_slows_tangential_motion() {
        let mut scene = World::new();
        let floor = scene.create_entity(TransformComponent::from_position(Vec3::new(0.0, -0.5, 0.0)));
        let ball = scene.create_entity(TransformComponent::from_position(Vec3::new(0.0, 0.45, 0.0)));

        let mut physics = PhysicsWorld::default();
        physics.add_box_collider(floor, Vec3::zeros(), Vec3::new(100.0, 1.0, 100.0)).unwrap();
        physics.add_sphere_collider(ball, Vec3::zeros(), 0.5).unwrap();
        let body = physics.add_rigidbody(Rigidbody::new(ball).with_velocity(Vec3::new(3.0, 0.0, 0.0)));

        physics.simulate(&mut scene, body, DT);

        let velocity = physics.rigidbody(body).unwrap().velocity;
        assert!(velocity.x < 3.0);
        assert!(velocity.x > 0.0);
        assert_relative_eq!(velocity.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_moving_body_hands_velocity_to_resting_body() {
        let mut scene = World::new();
        let mover = scene.create_entity(TransformComponent::identity());
        let target = scene.create_entity(TransformComponent::from_position(Vec3::new(0.9, 0.0, 0.0)));

        let mut physics = PhysicsWorld::new(PhysicsConfig::default().with_gravity(Vec3::zeros()));
        physics.add_box_collider(mover, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        physics.add_box_collider(target, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        let mover_body = physics.add_rigidbody(Rigidbody::new(mover).with_velocity(Vec3::new(4.0, 0.0, 0.0)));
        let target_body = physics.add_rigidbody(Rigidbody::new(target));

        physics.simulate(&mut scene, mover_body, DT);

        assert_relative_eq!(physics.rigidbody(mover_body).unwrap().velocity, Vec3::zeros(), epsilon = 1e-5);
        assert_relative_eq!(
            physics.rigidbody(target_body).unwrap().velocity,
            Vec3::new(4.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_kinematic_other_pushes_but_is_not_pushed() {
        let mut scene = World::new();
        let mover = scene.create_entity(TransformComponent::identity());
        let pusher = scene.create_entity(TransformComponent::from_position(Vec3::new(0.9, 0.0, 0.0)));

        let mut physics = PhysicsWorld::new(PhysicsConfig::default().with_gravity(Vec3::zeros()));
        physics.add_box_collider(mover, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        physics.add_box_collider(pusher, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        let mover_body = physics.add_rigidbody(Rigidbody::new(mover).with_velocity(Vec3::new(0.0, 0.0, 0.1)));
        let pusher_body = physics.add_rigidbody(
            Rigidbody::new(pusher)
                .with_kinematic(true)
                .with_velocity(Vec3::new(-2.0, 0.0, 0.0)),
        );

        physics.simulate(&mut scene, mover_body, DT);

        assert_relative_eq!(physics.rigidbody(mover_body).unwrap().velocity.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(
            physics.rigidbody(pusher_body).unwrap().velocity,
            Vec3::new(-2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_each_pair_resolves_once_per_move() {
        let mut scene = World::new();
        let wall = scene.create_entity(TransformComponent::from_position(Vec3::new(0.9, 0.0, 0.0)));
        let ball = scene.create_entity(TransformComponent::identity());

        let mut physics = PhysicsWorld::new(PhysicsConfig::default().with_gravity(Vec3::zeros()));
        physics.add_box_collider(wall, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        physics.add_box_collider(ball, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        let wall_body = physics.add_rigidbody(Rigidbody::new(wall));
        let ball_body = physics.add_rigidbody(
            Rigidbody::new(ball)
                .with_velocity(Vec3::new(1.0, 0.0, 0.0))
                .with_collision_detection_mode(CollisionDetectionMode::Continuous),
        );

        physics.simulate(&mut scene, ball_body, DT);

        // Eight sub-steps, but the wall only receives the impulse once
        assert_relative_eq!(
            physics.rigidbody(wall_body).unwrap().velocity,
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }
}
