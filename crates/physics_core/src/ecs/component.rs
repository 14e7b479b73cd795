//! Component trait
//!
//! Colliders and rigidbodies share the component lifecycle: they belong to
//! one owner entity and carry their own enable flag. A component is active
//! only when it is enabled and its owner is active in the scene.

use super::{Entity, SceneAccess};

/// Behaviour shared by everything attached to an entity
pub trait Component {
    /// The owning entity, or `None` for ownerless probes
    fn owner(&self) -> Option<Entity>;

    /// The component's own enable flag
    fn is_enabled(&self) -> bool;

    /// Enable or disable the component
    fn set_active(&mut self, active: bool);

    /// Whether the component takes part in queries and simulation
    fn is_active<S: SceneAccess + ?Sized>(&self, scene: &S) -> bool {
        self.is_enabled() && self.owner().map_or(true, |owner| scene.is_active(owner))
    }
}
