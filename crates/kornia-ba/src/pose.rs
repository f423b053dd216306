use serde::{Deserialize, Serialize};

use crate::error::{check_block_len, FactorResult};
use crate::rotation::angle_axis_rotate_point;
use crate::Scalar;

/// Number of values in an extrinsic parameter block.
pub const EXTRINSICS_DIM: usize = 6;

/// Offset of the angle-axis rotation in an extrinsic block.
pub const OFFSET_ROTATION: usize = 0;

/// Offset of the translation in an extrinsic block.
pub const OFFSET_TRANSLATION: usize = 3;

/// A rigid transform parameterized as `[rx, ry, rz, tx, ty, tz]`.
///
/// Maps world points into the camera frame: `p_cam = R(ω) · p + t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose<T = f64> {
    /// Angle-axis rotation vector (radians)
    pub rotation: [T; 3],
    /// Translation vector
    pub translation: [T; 3],
}

impl<T: Scalar> Pose<T> {
    /// Creates a pose from a rotation and a translation.
    pub fn new(rotation: [T; 3], translation: [T; 3]) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        let zero = T::from(0.0_f64);
        Self::new([zero; 3], [zero; 3])
    }

    /// Reads a pose from a flat 6-value block.
    pub fn from_block(block: &[T]) -> Self {
        debug_assert_eq!(block.len(), EXTRINSICS_DIM, "pose must have 6 params");

        let r = &block[OFFSET_ROTATION..OFFSET_ROTATION + 3];
        let t = &block[OFFSET_TRANSLATION..OFFSET_TRANSLATION + 3];
        Self::new([r[0], r[1], r[2]], [t[0], t[1], t[2]])
    }

    /// Reads a pose from a flat block, validating its length.
    pub fn try_from_block(block: &[T]) -> FactorResult<Self> {
        check_block_len(0, EXTRINSICS_DIM, block.len())?;
        Ok(Self::from_block(block))
    }

    /// Flattens the pose into the `[rx, ry, rz, tx, ty, tz]` layout.
    pub fn to_block(&self) -> [T; EXTRINSICS_DIM] {
        let (r, t) = (self.rotation, self.translation);
        [r[0], r[1], r[2], t[0], t[1], t[2]]
    }

    /// Applies only the rotation part: `R(ω) · p`.
    pub fn rotate(&self, point: &[T; 3]) -> [T; 3] {
        angle_axis_rotate_point(&self.rotation, point)
    }

    /// Applies the full transform: `R(ω) · p + t`.
    pub fn transform_point(&self, point: &[T; 3]) -> [T; 3] {
        let p = self.rotate(point);
        [
            p[0] + self.translation[0],
            p[1] + self.translation[1],
            p[2] + self.translation[2],
        ]
    }
}
