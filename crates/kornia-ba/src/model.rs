//! Camera models: each one specializes the shared projection pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FactorError;
use crate::intrinsics::{PinholeIntrinsics, RadialK1Intrinsics, RadialK3Intrinsics};
use crate::pose::Pose;
use crate::projection::{perspective_divide, point_from_block, project_point};
use crate::rig::{rig_transform_point, RigIntrinsics};
use crate::Scalar;

/// The camera models supported by the reprojection residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraModelKind {
    /// Pinhole camera without distortion
    Pinhole,
    /// Pinhole camera with one radial distortion coefficient
    PinholeRadialK1,
    /// Pinhole camera with three radial distortion coefficients
    PinholeRadialK3,
    /// Pinhole camera mounted on a rig with a fixed sub-pose
    PinholeRig,
}

impl CameraModelKind {
    /// All the supported camera models.
    pub const ALL: [CameraModelKind; 4] = [
        CameraModelKind::Pinhole,
        CameraModelKind::PinholeRadialK1,
        CameraModelKind::PinholeRadialK3,
        CameraModelKind::PinholeRig,
    ];

    /// Number of values in the intrinsic block of the model.
    pub const fn num_intrinsics(self) -> usize {
        match self {
            CameraModelKind::Pinhole => 3,
            CameraModelKind::PinholeRadialK1 => 4,
            CameraModelKind::PinholeRadialK3 => 6,
            CameraModelKind::PinholeRig => 9,
        }
    }

    /// The name of the model.
    pub const fn name(self) -> &'static str {
        match self {
            CameraModelKind::Pinhole => "pinhole",
            CameraModelKind::PinholeRadialK1 => "pinhole_radial_k1",
            CameraModelKind::PinholeRadialK3 => "pinhole_radial_k3",
            CameraModelKind::PinholeRig => "pinhole_rig",
        }
    }
}

impl fmt::Display for CameraModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraModelKind {
    type Err = FactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FactorError::UnknownCameraModel(s.to_string()))
    }
}

/// A camera model: maps a world point to a predicted pixel given flat parameter blocks.
///
/// Implementations are stateless and only use field arithmetic on `T`, so the same formula
/// evaluates plain values with `f64` and exact derivatives with dual numbers.
pub trait CameraModel: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The model identifier.
    const KIND: CameraModelKind;

    /// Number of values in the intrinsic block.
    const NUM_INTRINSICS: usize = Self::KIND.num_intrinsics();

    /// Predict the pixel where a world point is observed.
    ///
    /// # Arguments
    ///
    /// * `intrinsics` - The intrinsic block, `NUM_INTRINSICS` values.
    /// * `extrinsics` - The extrinsic block `[rx, ry, rz, tx, ty, tz]`.
    /// * `point` - The point block `[x, y, z]`.
    ///
    /// # Returns
    ///
    /// The predicted pixel `(u, v)`. Degenerate geometry yields non-finite values.
    fn project<T: Scalar>(intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2];
}

/// Pinhole camera: `[focal, ppx, ppy]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pinhole;

impl CameraModel for Pinhole {
    const KIND: CameraModelKind = CameraModelKind::Pinhole;

    fn project<T: Scalar>(intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        debug_assert_eq!(intrinsics.len(), Self::NUM_INTRINSICS);
        let k = PinholeIntrinsics::from_block(intrinsics);
        let pose = Pose::from_block(extrinsics);
        k.to_pixel(project_point(&pose, &point_from_block(point)))
    }
}

/// Pinhole camera with one radial coefficient: `[focal, ppx, ppy, k1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinholeRadialK1;

impl CameraModel for PinholeRadialK1 {
    const KIND: CameraModelKind = CameraModelKind::PinholeRadialK1;

    fn project<T: Scalar>(intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        let k = RadialK1Intrinsics::from_block(intrinsics);
        let pose = Pose::from_block(extrinsics);
        k.to_pixel(project_point(&pose, &point_from_block(point)))
    }
}

/// Pinhole camera with three radial coefficients: `[focal, ppx, ppy, k1, k2, k3]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinholeRadialK3;

impl CameraModel for PinholeRadialK3 {
    const KIND: CameraModelKind = CameraModelKind::PinholeRadialK3;

    fn project<T: Scalar>(intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        let k = RadialK3Intrinsics::from_block(intrinsics);
        let pose = Pose::from_block(extrinsics);
        k.to_pixel(project_point(&pose, &point_from_block(point)))
    }
}

/// Rig-mounted pinhole camera: `[focal, ppx, ppy, rx, ry, rz, tx, ty, tz]`.
///
/// The extrinsic block holds the rig pose; see [`crate::rig`] for the composition. No
/// distortion is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinholeRig;

impl CameraModel for PinholeRig {
    const KIND: CameraModelKind = CameraModelKind::PinholeRig;

    fn project<T: Scalar>(intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        let k = RigIntrinsics::from_block(intrinsics);
        let rig_pose = Pose::from_block(extrinsics);
        let pos_proj = rig_transform_point(&rig_pose, &k.subpose, &point_from_block(point));
        k.pinhole.to_pixel(perspective_divide(&pos_proj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EXTRINSICS: [f64; 6] = [0.1, -0.2, 0.05, 0.3, -0.1, 4.0];
    const POINT: [f64; 3] = [0.5, -0.4, 6.0];

    #[test]
    fn test_kind_num_intrinsics() {
        assert_eq!(Pinhole::NUM_INTRINSICS, 3);
        assert_eq!(PinholeRadialK1::NUM_INTRINSICS, 4);
        assert_eq!(PinholeRadialK3::NUM_INTRINSICS, 6);
        assert_eq!(PinholeRig::NUM_INTRINSICS, 9);
    }

    #[test]
    fn test_kind_names_roundtrip() -> Result<(), FactorError> {
        for kind in CameraModelKind::ALL {
            assert_eq!(kind.to_string().parse::<CameraModelKind>()?, kind);
        }
        assert_eq!(
            "fisheye".parse::<CameraModelKind>(),
            Err(FactorError::UnknownCameraModel("fisheye".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_kind_serde() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&CameraModelKind::PinholeRadialK3)?;
        assert_eq!(json, "\"pinhole_radial_k3\"");
        let kind: CameraModelKind = serde_json::from_str("\"pinhole_rig\"")?;
        assert_eq!(kind, CameraModelKind::PinholeRig);
        Ok(())
    }

    #[test]
    fn test_pinhole_identity_projection() {
        let uv = Pinhole::project(&[1000.0f64, 320.0, 240.0], &[0.0; 6], &[0.0, 0.0, 10.0]);
        assert_eq!(uv, [320.0, 240.0]);
    }

    #[test]
    fn test_pinhole_projection_off_axis() {
        let uv = Pinhole::project(&[500.0f64, 320.0, 240.0], &[0.0; 6], &[1.0, -2.0, 5.0]);
        assert_relative_eq!(uv[0], 420.0, epsilon = 1e-9);
        assert_relative_eq!(uv[1], 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_radial_models_reduce_to_pinhole() {
        let pinhole = Pinhole::project(&[900.0, 310.0, 250.0], &EXTRINSICS, &POINT);
        let k1 = PinholeRadialK1::project(&[900.0, 310.0, 250.0, 0.0], &EXTRINSICS, &POINT);
        let k3 = PinholeRadialK3::project(
            &[900.0, 310.0, 250.0, 0.0, 0.0, 0.0],
            &EXTRINSICS,
            &POINT,
        );
        assert_eq!(pinhole, k1);
        assert_eq!(pinhole, k3);
    }

    #[test]
    fn test_radial_k1_barrel_pulls_towards_center() {
        let intr = [900.0, 310.0, 250.0];
        let pinhole = Pinhole::project(&intr, &EXTRINSICS, &POINT);
        let barrel = PinholeRadialK1::project(&[900.0, 310.0, 250.0, -0.2], &EXTRINSICS, &POINT);
        let d0 = (pinhole[0] - 310.0).hypot(pinhole[1] - 250.0);
        let d1 = (barrel[0] - 310.0).hypot(barrel[1] - 250.0);
        assert!(d1 < d0);
    }

    #[test]
    fn test_rig_identity_subpose_matches_rotation_only_pinhole() {
        // rig translation is not part of the composition, so compare against a pinhole camera
        // with the same rotation and no translation
        let rig_pose = [0.1, -0.2, 0.05, 7.0, 7.0, 7.0];
        let pinhole_pose = [0.1, -0.2, 0.05, 0.0, 0.0, 0.0];
        let rig = PinholeRig::project(
            &[900.0, 310.0, 250.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            &rig_pose,
            &POINT,
        );
        let pinhole = Pinhole::project(&[900.0, 310.0, 250.0], &pinhole_pose, &POINT);
        assert_relative_eq!(rig[0], pinhole[0], epsilon = 1e-9);
        assert_relative_eq!(rig[1], pinhole[1], epsilon = 1e-9);
    }

    #[test]
    fn test_zero_depth_is_non_finite() {
        let uv = PinholeRadialK3::project(
            &[900.0f64, 310.0, 250.0, 0.1, 0.01, 0.001],
            &[0.0; 6],
            &[1.0, 1.0, 0.0],
        );
        assert!(!uv[0].is_finite());
        assert!(!uv[1].is_finite());
    }
}
