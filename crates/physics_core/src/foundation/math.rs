//! Math utilities and types
//!
//! Provides the vector, matrix and transform types shared by the collision
//! and dynamics code.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Tolerance used by [`utils::float_equals`]
pub const EPSILON: f32 = 1e-6;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors (may be non-uniform)
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from position, rotation and scale
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Apply this transform to a direction (rotation and scale, no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(vector)
    }

    /// Largest absolute scale factor, used to grow radii conservatively
    pub fn max_scale(&self) -> f32 {
        self.scale.abs().max()
    }

    /// Combine this transform (parent) with another (child)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * self.scale.component_mul(&other.position),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Map a world-space displacement into this transform's local space
    pub fn inverse_transform_vector(&self, vector: &Vec3) -> Vec3 {
        let local = self.rotation.inverse() * vector;
        Vec3::new(
            safe_div(local.x, self.scale.x),
            safe_div(local.y, self.scale.y),
            safe_div(local.z, self.scale.z),
        )
    }
}

fn safe_div(value: f32, divisor: f32) -> f32 {
    if divisor.abs() > EPSILON {
        value / divisor
    } else {
        0.0
    }
}

/// Math utility functions
pub mod utils {
    use super::{Vec3, EPSILON};

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Component-wise clamp of a vector into the box `[min, max]`
    pub fn clamp_vec(value: &Vec3, min: &Vec3, max: &Vec3) -> Vec3 {
        Vec3::new(
            clamp(value.x, min.x, max.x),
            clamp(value.y, min.y, max.y),
            clamp(value.z, min.z, max.z),
        )
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Linear interpolation between two vectors
    pub fn lerp_vec(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Snap a value to whichever of `min` or `max` is nearer
    pub fn snap(value: f32, min: f32, max: f32) -> f32 {
        if (value - min).abs() <= (max - value).abs() {
            min
        } else {
            max
        }
    }

    /// Approximate float equality with an absolute and relative tolerance
    pub fn float_equals(a: f32, b: f32) -> bool {
        let diff = (a - b).abs();
        diff <= EPSILON || diff <= EPSILON * a.abs().max(b.abs())
    }

    /// Sign of a value: -1, 0 or 1
    pub fn sign(value: f32) -> f32 {
        if value > 0.0 {
            1.0
        } else if value < 0.0 {
            -1.0
        } else {
            0.0
        }
    }

    /// Whether every component of the vector is finite
    pub fn is_finite(value: &Vec3) -> bool {
        value.iter().all(|component| component.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_point_applies_scale_rotation_translation() {
        let transform = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 2.0, 2.0),
        );

        let point = transform.transform_point(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point, Vec3::new(1.0, 4.0, 3.0), epsilon = 1e-5);

        let from_matrix = transform.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(from_matrix.coords, point, epsilon = 1e-5);
    }

    #[test]
    fn test_combine_composes_parent_and_child() {
        let parent = Transform::new(Vec3::new(10.0, 0.0, 0.0), Quat::identity(), Vec3::new(2.0, 2.0, 2.0));
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let global = parent.combine(&child);
        assert_relative_eq!(global.position, Vec3::new(12.0, 0.0, 0.0));
        assert_relative_eq!(global.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_inverse_transform_vector_round_trips() {
        let transform = Transform::new(
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::y_axis(), 0.7),
            Vec3::new(2.0, 0.5, 1.0),
        );
        let delta = Vec3::new(0.3, -1.2, 4.0);
        let local = transform.inverse_transform_vector(&delta);
        assert_relative_eq!(transform.transform_vector(&local), delta, epsilon = 1e-5);
    }

    #[test]
    fn test_snap_picks_nearest_bound() {
        assert_eq!(utils::snap(0.2, 0.0, 1.0), 0.0);
        assert_eq!(utils::snap(0.8, 0.0, 1.0), 1.0);
        assert_eq!(utils::snap(-3.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_sign_and_float_equals() {
        assert_eq!(utils::sign(-2.0), -1.0);
        assert_eq!(utils::sign(0.0), 0.0);
        assert!(utils::float_equals(1.0, 1.0 + 1e-7));
        assert!(!utils::float_equals(1.0, 1.001));
    }
}
