//! Collision geometry
//!
//! Shapes are stored in model space and transformed to world space only
//! while a test runs:
//!
//! - [`primitives`] - rays, bounds, bounding spheres and segment helpers
//! - [`shape`] - model-space [`ColliderShape`] and world-space [`WorldSpaceShape`]
//! - [`narrow_phase`] - exact pairwise and ray tests behind the shape dispatch

pub mod narrow_phase;
pub mod primitives;
pub mod shape;

pub use primitives::{
    closest_point_on_segment, closest_points_between_segments, BoundingSphere, Bounds, Ray, RaycastHit,
};
pub use shape::{ColliderShape, WorldBox, WorldCapsule, WorldSpaceShape};
