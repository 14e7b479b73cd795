//! # Physics Core
//!
//! Collision geometry, scene queries and rigidbody dynamics for a
//! scene-graph based engine.
//!
//! ## Features
//!
//! - **Colliders**: boxes, spheres and capsules stored in model space and
//!   evaluated against the owner's current global transform
//! - **Queries**: point, ray and pairwise tests, raycasts and region overlaps
//! - **Rigidbodies**: forces, gravity, drag, sleeping and sub-stepped contact
//!   resolution with friction
//! - **Configuration**: world-wide settings loaded from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use physics_core::prelude::*;
//!
//! let mut scene = World::new();
//! let ground = scene.create_entity(TransformComponent::from_position(Vec3::new(0.0, -0.5, 0.0)));
//! let ball = scene.create_entity(TransformComponent::from_position(Vec3::new(0.0, 5.0, 0.0)));
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//! physics.add_box_collider(ground, Vec3::zeros(), Vec3::new(20.0, 1.0, 20.0))?;
//! physics.add_sphere_collider(ball, Vec3::zeros(), 0.5)?;
//! physics.create_rigidbody(ball);
//!
//! let mut clock = FixedTimestep::new(1.0 / 60.0);
//! for _ in 0..120 {
//!     physics.step(&mut scene, clock.delta_time());
//!     clock.tick();
//! }
//!
//! let hit = physics.raycast_unbounded(&scene, Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
//! assert!(hit.is_hit());
//! # Ok::<(), PhysicsError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        ecs::{components::TransformComponent, Component, Entity, SceneAccess, SceneAccessMut, World},
        foundation::{
            math::{Quat, Transform, Vec3},
            time::{DeltaTime, FixedTimestep, Timer},
        },
        physics::{
            Bounds, Collider, ColliderHandle, ColliderShape, CollisionDetectionMode, ForceMode, PhysicsError,
            PhysicsResult, PhysicsWorld, Ray, RaycastHit, Rigidbody, RigidbodyHandle,
        },
    };
}
