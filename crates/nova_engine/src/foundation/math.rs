//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene management.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
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

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        let matrix = self.to_matrix();
        matrix.transform_point(&point)
    }

    /// Combine this transform with another (this acts as the parent)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Rotation that orients the local +Z (forward) axis from `eye` toward `target`
///
/// Y-up right-handed convention; `up` is the approximate up direction and
/// must not be parallel to the view direction.
pub fn look_at_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    Quat::face_towards(&(target - eye), &up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_combine_translation() {
        let parent = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let child = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position.x, 1.0);
        assert_relative_eq!(combined.position.y, 2.0);
    }

    #[test]
    fn test_transform_combine_scale() {
        let parent = Transform {
            scale: Vec3::new(2.0, 2.0, 2.0),
            ..Default::default()
        };
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let combined = parent.combine(&child);
        assert_relative_eq!(combined.position.x, 2.0);
        assert_relative_eq!(combined.scale.x, 2.0);
    }

    #[test]
    fn test_look_at_rotation_faces_target() {
        let rotation = look_at_rotation(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let forward = rotation * Vec3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(forward.z, 1.0, epsilon = 1e-5);
    }
}
