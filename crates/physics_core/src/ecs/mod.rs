//! Entity and scene collaborator
//!
//! The physics code consumes three things from the scene: an entity's global
//! transform, whether it is active, and (for rigidbodies) a way to move it.

pub mod component;
pub mod components;
pub mod entity;
pub mod scene;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use scene::{SceneAccess, SceneAccessMut};
pub use world::World;
