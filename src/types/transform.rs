//! World-space node transform.

use glam::{Mat4, Quat, Vec3};

/// World-space transform of a scene node.
///
/// Scale is the accumulated world scale and may be non-uniform or negative
/// for mirrored geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// TRS matrix for drawing the node's mesh in world space.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// The node's rotated basis vectors (right, up, forward).
    pub fn direction_vectors(&self) -> (Vec3, Vec3, Vec3) {
        (
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::Z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_directions() {
        let (x, y, z) = Transform::IDENTITY.direction_vectors();
        assert_eq!(x, Vec3::X);
        assert_eq!(y, Vec3::Y);
        assert_eq!(z, Vec3::Z);
    }

    #[test]
    fn test_rotated_directions() {
        // 90 degrees around Y sends +X to -Z.
        let transform = Transform::new(
            Vec3::ZERO,
            Quat::from_rotation_y(FRAC_PI_2),
            Vec3::ONE,
        );
        let (x, _, _) = transform.direction_vectors();
        assert!(x.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_matrix_applies_translation() {
        let transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::ONE);
        let p = transform.matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
    }
}
