//! Ray casting against the collider registry
//!
//! An exhaustive scan in registration order. Each candidate is first bounded
//! from below by projecting its closest surface point onto the ray, so the
//! exact ray test only runs for colliders that could still beat the best hit.

use super::collision::{Ray, RaycastHit};
use super::registry::ColliderRegistry;
use crate::ecs::{Component, SceneAccess};
use crate::foundation::math::Vec3;

/// Nearest hit along the ray within `max_distance`
///
/// Inactive colliders are skipped. Ties keep the earlier registered collider.
pub fn cast<S: SceneAccess + ?Sized>(
    registry: &ColliderRegistry,
    scene: &S,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> RaycastHit {
    let ray = Ray::new(origin, direction);
    let max_distance_squared = max_distance * max_distance;

    let mut best_distance_squared = f32::INFINITY;
    let mut best_collider = None;

    for (handle, collider) in registry.iter() {
        if !collider.is_active(scene) {
            continue;
        }

        let surface = collider.closest_point_on_surface(scene, &origin);
        let lower_bound = (surface - origin).dot(&ray.direction).max(0.0);
        let lower_bound_squared = lower_bound * lower_bound;
        if lower_bound_squared > max_distance_squared || lower_bound_squared >= best_distance_squared {
            continue;
        }

        let Some(distance_squared) = collider.check_ray_distance(scene, &ray) else {
            continue;
        };
        if distance_squared > max_distance_squared || distance_squared >= best_distance_squared {
            continue;
        }

        best_distance_squared = distance_squared;
        best_collider = Some(handle);
    }

    match best_collider {
        Some(handle) => {
            let distance = best_distance_squared.sqrt();
            RaycastHit {
                position: ray.point_at(distance),
                collider: Some(handle),
                distance,
            }
        }
        None => RaycastHit::none(),
    }
}
