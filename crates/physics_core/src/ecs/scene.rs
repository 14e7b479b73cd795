//! Scene access seam
//!
//! The physics world never owns entities. Everything it needs from the scene
//! graph goes through [`SceneAccess`], so a game can plug in its own scene
//! while tests use the bundled [`World`](super::World).

use super::Entity;
use crate::foundation::math::{Transform, Vec3};

/// Read access to the scene graph as seen by the physics code
pub trait SceneAccess {
    /// Global transform of the entity, composed with all of its ancestors
    ///
    /// Unknown entities resolve to `None`; colliders then fall back to the
    /// identity transform.
    fn global_transform(&self, entity: Entity) -> Option<Transform>;

    /// Whether the entity (and every ancestor) is active
    fn is_active(&self, entity: Entity) -> bool;
}

/// Write access needed by rigidbody integration
pub trait SceneAccessMut: SceneAccess {
    /// Move the entity by a world-space displacement
    fn translate(&mut self, entity: Entity, delta: Vec3);
}
