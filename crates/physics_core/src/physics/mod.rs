//! Physics module: colliders, queries and rigidbody dynamics
//!
//! Everything hangs off a [`PhysicsWorld`]: it owns the collider registry and
//! the rigidbodies, answers ray and overlap queries, and steps the bodies.
//! Queries are exhaustive scans over the registry in registration order.

pub mod collider;
pub mod collision;
pub mod error;
pub mod overlap;
pub mod raycast;
pub mod registry;
pub mod rigidbody;
pub mod simulation;
pub mod world;

pub use collider::Collider;
pub use collision::{Bounds, ColliderShape, Ray, RaycastHit, WorldSpaceShape};
pub use error::{PhysicsError, PhysicsResult};
pub use registry::{ColliderHandle, ColliderRegistry};
pub use rigidbody::{CollisionDetectionMode, ForceMode, Rigidbody};
pub use simulation::contact_normal;
pub use world::{PhysicsWorld, RigidbodyHandle};
