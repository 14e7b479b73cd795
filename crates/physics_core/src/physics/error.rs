//! Physics error types

use crate::physics::registry::ColliderHandle;
use thiserror::Error;

/// Errors reported by the physics world and its components
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A raw force mode code outside the known set
    #[error("invalid force mode: {0}")]
    InvalidForceMode(u8),

    /// Shape parameters that cannot describe a collider
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// The handle does not name a live collider
    #[error("unknown collider: {0:?}")]
    UnknownCollider(ColliderHandle),

    /// The collider arena and the ordered handle list disagree
    #[error("collider registry corrupted: {0}")]
    RegistryCorrupted(String),
}

/// Convenience result alias for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
