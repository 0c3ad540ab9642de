use glam::{Affine3A, Quat, Vec3};

/// Converts a host rotation to glam's convention.
///
/// Host rotations are mirror-handed: a stored quaternion `q` rotates vectors
/// by `q.conjugate()` in glam terms.
#[inline]
#[must_use]
pub fn host_to_glam(rotation: Quat) -> Quat {
    rotation.conjugate()
}

/// Converts a glam rotation to the host's mirror-handed convention.
#[inline]
#[must_use]
pub fn glam_to_host(rotation: Quat) -> Quat {
    rotation.conjugate()
}

/// Static TRS value of a node.
///
/// This is the value a channel reports when it holds no keys. The
/// `rotation` field is stored in the host convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Composes position, rotation and scale into an affine matrix.
    #[must_use]
    pub fn compose(position: Vec3, rotation: Quat, scale: Vec3) -> Affine3A {
        Affine3A::from_scale_rotation_translation(scale, host_to_glam(rotation), position)
    }

    /// Splits an affine matrix into host position, rotation and scale.
    ///
    /// Shear is lost in the decomposition.
    #[must_use]
    pub fn decompose(matrix: &Affine3A) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation: glam_to_host(rotation),
            scale,
        }
    }

    /// Returns the local matrix of this static value.
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Affine3A {
        Self::compose(self.position, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
