//! Live collider registry
//!
//! Every collider is registered on creation and released on removal.
//! Handles are stable slot map keys; iteration follows registration order,
//! which makes every scan over the registry deterministic.

use super::collider::Collider;
use super::error::{PhysicsError, PhysicsResult};
use crate::ecs::{Component, Entity};
use crate::foundation::collections::{new_key_type, OrderedSlotMap};

new_key_type! {
    /// Stable identity of a registered collider
    pub struct ColliderHandle;
}

/// Arena of live colliders in registration order
#[derive(Debug, Default)]
pub struct ColliderRegistry {
    colliders: OrderedSlotMap<ColliderHandle, Collider>,
}

impl ColliderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collider
    pub fn insert(&mut self, collider: Collider) -> ColliderHandle {
        let kind = collider.shape().kind();
        let handle = self.colliders.insert(collider);
        log::debug!("Registered {} collider {:?} ({} live)", kind, handle, self.colliders.len());
        handle
    }

    /// Release a collider
    pub fn remove(&mut self, handle: ColliderHandle) -> PhysicsResult<Collider> {
        let listed = self.colliders.position(handle).is_some();
        let live = self.colliders.contains_key(handle);

        match (live, listed) {
            (false, false) => Err(PhysicsError::UnknownCollider(handle)),
            (true, true) => {
                let collider = self
                    .colliders
                    .remove(handle)
                    .ok_or_else(|| corrupted(format!("collider {handle:?} vanished during removal")))?;
                log::debug!("Released collider {:?} ({} live)", handle, self.colliders.len());
                Ok(collider)
            }
            (true, false) => Err(corrupted(format!("collider {handle:?} is live but not listed"))),
            (false, true) => Err(corrupted(format!("collider {handle:?} is listed but not live"))),
        }
    }

    /// Look up a collider
    pub fn get(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Look up a collider mutably
    pub fn get_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Whether the handle names a live collider
    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.colliders.contains_key(handle)
    }

    /// Number of live colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether no collider is registered
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Snapshot of every live handle in registration order
    pub fn handles(&self) -> Vec<ColliderHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Live colliders in registration order
    pub fn iter(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> + '_ {
        self.colliders.iter()
    }

    /// Handles of the colliders owned by `owner`, in registration order
    pub fn owned_by(&self, owner: Entity) -> Vec<ColliderHandle> {
        self.iter()
            .filter(|(_, collider)| collider.owner() == Some(owner))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Check that the arena and the registration order agree
    pub fn verify(&self) -> PhysicsResult<()> {
        self.colliders.check_consistency().map_err(corrupted)
    }
}

fn corrupted(reason: String) -> PhysicsError {
    log::error!("Collider registry corrupted: {}", reason);
    debug_assert!(false, "collider registry corrupted: {reason}");
    PhysicsError::RegistryCorrupted(reason)
}
