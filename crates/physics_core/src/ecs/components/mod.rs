//! ECS Components module

pub mod transform;

pub use transform::TransformComponent;
