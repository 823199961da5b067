use glam::{Quat, Vec3};

/// Tolerance used when comparing reference poses of the same bone across skeletons.
pub const POSE_TOLERANCE: f32 = 1.0e-4;

/// Rigid transform (translation, rotation, scale) of a bone in its parent's space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
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
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Maps a point from this transform's local space into the space it is expressed in.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    pub fn transform_rotation(&self, rotation: Quat) -> Quat {
        (self.rotation * rotation).normalize()
    }

    /// Composes `child` (expressed in this transform's space) into this transform's parent
    /// space.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: self.transform_rotation(child.rotation),
            scale: self.scale * child.scale,
        }
    }

    /// Component-wise comparison. `q` and `-q` describe the same rotation and compare equal.
    pub fn equals(&self, other: &Transform, tolerance: f32) -> bool {
        let rotation_equal = self.rotation.abs_diff_eq(other.rotation, tolerance)
            || self.rotation.abs_diff_eq(-other.rotation, tolerance);
        rotation_equal
            && self.translation.abs_diff_eq(other.translation, tolerance)
            && self.scale.abs_diff_eq(other.scale, tolerance)
    }
}
