//! Camera rigs: a pinhole camera mounted with a fixed offset (sub-pose) on a rig whose pose is
//! optimized.
//!
//! The sub-pose is constant for a physical camera of the rig, so it lives in the intrinsic block
//! (`[focal, ppx, ppy, rx, ry, rz, tx, ty, tz]`) rather than in the per-frame extrinsic block.
//!
//! The composed transform reproduces the formula used by existing rig calibrations:
//!
//! ```text
//! p_cam = R_s · R · X + t_s + R · t_s
//! ```
//!
//! where `(R, t)` is the rig pose and `(R_s, t_s)` the sub-pose. Note that the rig translation
//! `t` does not take part in the composition and the sub-pose translation is rotated by the rig
//! rotation. A first-principles composition would read `R_s · (R · X + t) + t_s`; the formula
//! above is kept as is so that results stay comparable with previous calibrations.

use serde::{Deserialize, Serialize};

use crate::error::{check_block_len, FactorResult};
use crate::intrinsics::PinholeIntrinsics;
use crate::pose::{Pose, EXTRINSICS_DIM};
use crate::Scalar;

/// Offset of the sub-pose rotation in a rig intrinsic block.
pub const OFFSET_SUBPOSE_ROTATION: usize = 3;

/// Offset of the sub-pose translation in a rig intrinsic block.
pub const OFFSET_SUBPOSE_TRANSLATION: usize = 6;

/// Intrinsics of a rig-mounted pinhole camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigIntrinsics<T = f64> {
    /// Focal length and principal point
    pub pinhole: PinholeIntrinsics<T>,
    /// Fixed offset of the camera with respect to the rig
    pub subpose: Pose<T>,
}

impl<T: Scalar> RigIntrinsics<T> {
    /// Number of values in the flat block.
    pub const LEN: usize = 9;

    /// Reads the intrinsics from a `[focal, ppx, ppy, rx, ry, rz, tx, ty, tz]` block.
    pub fn from_block(block: &[T]) -> Self {
        debug_assert_eq!(block.len(), Self::LEN, "intrinsics must have 9 params");
        Self {
            pinhole: PinholeIntrinsics::from_block(block),
            subpose: Pose::from_block(
                &block[OFFSET_SUBPOSE_ROTATION..OFFSET_SUBPOSE_ROTATION + EXTRINSICS_DIM],
            ),
        }
    }

    /// Reads the intrinsics from a block, validating its length.
    pub fn try_from_block(block: &[T]) -> FactorResult<Self> {
        check_block_len(0, Self::LEN, block.len())?;
        Ok(Self::from_block(block))
    }

    /// Flattens the intrinsics into `[focal, ppx, ppy, rx, ry, rz, tx, ty, tz]`.
    pub fn to_block(&self) -> [T; 9] {
        let [f, ppx, ppy] = self.pinhole.to_block();
        let [rx, ry, rz, tx, ty, tz] = self.subpose.to_block();
        [f, ppx, ppy, rx, ry, rz, tx, ty, tz]
    }
}

/// Map a world point into the frame of a rig-mounted camera.
///
/// # Arguments
///
/// * `rig_pose` - The optimized pose of the rig. Only its rotation is used.
/// * `subpose` - The fixed offset of the camera on the rig.
/// * `point` - The 3D point in world coordinates.
///
/// # Returns
///
/// The point in the camera frame: `R_s · R · X + t_s + R · t_s`.
pub fn rig_transform_point<T: Scalar>(
    rig_pose: &Pose<T>,
    subpose: &Pose<T>,
    point: &[T; 3],
) -> [T; 3] {
    // R_s R X
    let pos_rig = rig_pose.rotate(point);
    let pos_proj = subpose.rotate(&pos_rig);

    // R t_s
    let rig_trans = rig_pose.rotate(&subpose.translation);

    let t_s = subpose.translation;
    [
        pos_proj[0] + (t_s[0] + rig_trans[0]),
        pos_proj[1] + (t_s[1] + rig_trans[1]),
        pos_proj[2] + (t_s[2] + rig_trans[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rig_block_layout() {
        let block = [800.0f64, 320.0, 240.0, 0.1, 0.2, 0.3, 1.0, 2.0, 3.0];
        let k = RigIntrinsics::from_block(&block);
        assert_eq!(k.pinhole.focal, 800.0);
        assert_eq!(k.pinhole.principal_point, [320.0, 240.0]);
        assert_eq!(k.subpose.rotation, [0.1, 0.2, 0.3]);
        assert_eq!(k.subpose.translation, [1.0, 2.0, 3.0]);
        assert_eq!(k.to_block(), block);
        assert!(RigIntrinsics::<f64>::try_from_block(&block[..8]).is_err());
    }

    #[test]
    fn test_rig_identity_subpose() {
        // with an identity sub-pose only the rig rotation acts on the point
        let rig = Pose::<f64>::new([0.0, 0.0, FRAC_PI_2], [5.0, 5.0, 5.0]);
        let p = rig_transform_point(&rig, &Pose::identity(), &[1.0, 0.0, 4.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rig_translation_ignores_rig_translation() {
        let subpose = Pose::<f64>::new([0.0; 3], [0.5, 0.0, 1.0]);
        let point = [0.0, 0.0, 2.0];
        let a = rig_transform_point(&Pose::new([0.0; 3], [0.0; 3]), &subpose, &point);
        let b = rig_transform_point(&Pose::new([0.0; 3], [9.0; 3]), &subpose, &point);
        assert_eq!(a, b);
        // X + t_s + t_s with identity rotations
        assert_eq!(a, [1.0, 0.0, 4.0]);
    }

    #[test]
    fn test_rig_composition_order() {
        // R_s R X + t_s + R t_s, with R a quarter turn about z and R_s a quarter turn about x
        let rig = Pose::<f64>::new([0.0, 0.0, FRAC_PI_2], [0.0; 3]);
        let subpose = Pose::<f64>::new([FRAC_PI_2, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let p = rig_transform_point(&rig, &subpose, &[1.0, 0.0, 0.0]);
        // R X = (0, 1, 0); R_s (0, 1, 0) = (0, 0, 1)
        // R t_s = (0, 1, 0); t_s + R t_s = (1, 1, 0)
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-12);
    }
}
