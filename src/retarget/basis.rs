//! Axis-convention correction between authored (Y-up) and host (Z-up)
//! space.

use glam::{Mat3, Quat, Vec3};

use crate::scene::transform::{glam_to_host, host_to_glam};

/// Fixed orthonormal basis taking authored axes to host axes:
/// `(x, y, z) -> (x, -z, y)`. A +90° turn about X.
pub const CORRECTION_BASIS: Mat3 = Mat3::from_cols(
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(0.0, -1.0, 0.0),
);

/// Point transform through the correction basis.
#[inline]
#[must_use]
pub fn correct_point(point: Vec3) -> Vec3 {
    CORRECTION_BASIS * point
}

/// Composes a host rotation with the correction basis, applied after the
/// rotation itself.
///
/// Works on matrices rather than swapping quaternion components, which keeps
/// handedness intact.
#[must_use]
pub fn correct_rotation(rotation: Quat) -> Quat {
    let rotated = CORRECTION_BASIS * Mat3::from_quat(host_to_glam(rotation));
    glam_to_host(Quat::from_mat3(&rotated).normalize())
}
