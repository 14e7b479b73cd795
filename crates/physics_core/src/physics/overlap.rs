//! Region overlap queries
//!
//! A query wraps the requested region in an ownerless probe collider and
//! runs the ordinary pairwise tests against every live collider. The probe
//! is never registered, so it can never report itself.

use super::collider::Collider;
use super::registry::{ColliderHandle, ColliderRegistry};
use crate::ecs::{Component, SceneAccess};

/// Active colliders intersecting `probe`, in registration order
pub fn overlapping<S: SceneAccess + ?Sized>(
    registry: &ColliderRegistry,
    scene: &S,
    probe: &Collider,
) -> Vec<ColliderHandle> {
    let probe_shape = probe.world_shape(scene);

    registry
        .iter()
        .filter(|(_, candidate)| candidate.is_active(scene))
        .filter(|(_, candidate)| probe_shape.intersects(&candidate.world_shape(scene)))
        .map(|(handle, _)| handle)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;
    use crate::ecs::World;
    use crate::foundation::math::Vec3;
    use crate::physics::collision::ColliderShape;

    #[test]
    fn test_probe_reports_touching_colliders_only() {
        let mut scene = World::new();
        let mut registry = ColliderRegistry::new();

        let inside = scene.create_entity(TransformComponent::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let outside = scene.create_entity(TransformComponent::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let inside_handle = registry.insert(Collider::new(inside, ColliderShape::sphere(Vec3::zeros(), 0.5).unwrap()));
        registry.insert(Collider::new(outside, ColliderShape::sphere(Vec3::zeros(), 0.5).unwrap()));

        let probe = Collider::probe(ColliderShape::sphere(Vec3::zeros(), 1.0).unwrap());
        assert_eq!(overlapping(&registry, &scene, &probe), vec![inside_handle]);
    }
}
