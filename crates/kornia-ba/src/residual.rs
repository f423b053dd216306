//! Reprojection residual evaluators.

use std::marker::PhantomData;

use crate::model::{
    CameraModel, CameraModelKind, Pinhole, PinholeRadialK1, PinholeRadialK3, PinholeRig,
};
use crate::pose::EXTRINSICS_DIM;
use crate::projection::POINT_DIM;
use crate::Scalar;

/// Number of values in a reprojection residual.
pub const RESIDUAL_DIM: usize = 2;

/// A residual over the `[intrinsics, extrinsics, point]` parameter blocks.
///
/// The evaluation is generic over the scalar type so that it can be run with plain `f64`
/// values or with dual numbers to obtain exact derivatives.
pub trait ResidualFunction {
    /// Lengths of the `[intrinsics, extrinsics, point]` blocks.
    fn parameter_dims(&self) -> [usize; 3];

    /// Evaluate the residual.
    ///
    /// The evaluation never fails: degenerate inputs (zero depth, zero focal length)
    /// produce non-finite or meaningless values that the optimizer is expected to handle.
    fn evaluate<T: Scalar>(&self, intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2];
}

/// Reprojection residual of one observation: `predicted pixel - observed pixel`.
///
/// The observation is the only state and it is never mutated, so a residual can be shared
/// across threads and evaluated concurrently.
///
/// Example:
/// ```
/// use kornia_ba::{PinholeResidual, ResidualFunction};
///
/// let residual = PinholeResidual::new([320.0, 240.0]);
/// let r = residual.evaluate(&[1000.0_f64, 320.0, 240.0], &[0.0; 6], &[0.0, 0.0, 10.0]);
/// assert_eq!(r, [0.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReprojectionResidual<M> {
    observation: [f64; 2],
    model: PhantomData<M>,
}

impl<M: CameraModel> ReprojectionResidual<M> {
    /// Creates the residual for an observed pixel `(x, y)`.
    pub fn new(observation: [f64; 2]) -> Self {
        Self {
            observation,
            model: PhantomData,
        }
    }

    /// The observed pixel.
    pub fn observation(&self) -> [f64; 2] {
        self.observation
    }

    /// The camera model of the residual.
    pub fn kind(&self) -> CameraModelKind {
        M::KIND
    }

    /// Predict the pixel of the point, without subtracting the observation.
    pub fn predict<T: Scalar>(&self, intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        M::project(intrinsics, extrinsics, point)
    }
}

impl<M: CameraModel> ResidualFunction for ReprojectionResidual<M> {
    fn parameter_dims(&self) -> [usize; 3] {
        [M::NUM_INTRINSICS, EXTRINSICS_DIM, POINT_DIM]
    }

    fn evaluate<T: Scalar>(&self, intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        let projected = self.predict(intrinsics, extrinsics, point);
        [
            projected[0] - self.observation[0],
            projected[1] - self.observation[1],
        ]
    }
}

/// Residual for a pinhole camera.
pub type PinholeResidual = ReprojectionResidual<Pinhole>;

/// Residual for a pinhole camera with one radial coefficient.
pub type PinholeRadialK1Residual = ReprojectionResidual<PinholeRadialK1>;

/// Residual for a pinhole camera with three radial coefficients.
pub type PinholeRadialK3Residual = ReprojectionResidual<PinholeRadialK3>;

/// Residual for a rig-mounted pinhole camera.
pub type PinholeRigResidual = ReprojectionResidual<PinholeRig>;

/// A reprojection residual whose camera model is chosen at runtime.
///
/// Used when assembling a problem from cameras of mixed types: the intrinsic type of each
/// camera selects the matching residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnyReprojectionResidual {
    /// Pinhole camera
    Pinhole(PinholeResidual),
    /// Pinhole camera with one radial coefficient
    PinholeRadialK1(PinholeRadialK1Residual),
    /// Pinhole camera with three radial coefficients
    PinholeRadialK3(PinholeRadialK3Residual),
    /// Rig-mounted pinhole camera
    PinholeRig(PinholeRigResidual),
}

impl AnyReprojectionResidual {
    /// Creates the residual of an observation for the given camera model.
    pub fn new(kind: CameraModelKind, observation: [f64; 2]) -> Self {
        log::debug!("creating {kind} reprojection residual for observation {observation:?}");
        match kind {
            CameraModelKind::Pinhole => Self::Pinhole(ReprojectionResidual::new(observation)),
            CameraModelKind::PinholeRadialK1 => {
                Self::PinholeRadialK1(ReprojectionResidual::new(observation))
            }
            CameraModelKind::PinholeRadialK3 => {
                Self::PinholeRadialK3(ReprojectionResidual::new(observation))
            }
            CameraModelKind::PinholeRig => Self::PinholeRig(ReprojectionResidual::new(observation)),
        }
    }

    /// The camera model of the residual.
    pub fn kind(&self) -> CameraModelKind {
        match self {
            Self::Pinhole(r) => r.kind(),
            Self::PinholeRadialK1(r) => r.kind(),
            Self::PinholeRadialK3(r) => r.kind(),
            Self::PinholeRig(r) => r.kind(),
        }
    }

    /// The observed pixel.
    pub fn observation(&self) -> [f64; 2] {
        match self {
            Self::Pinhole(r) => r.observation(),
            Self::PinholeRadialK1(r) => r.observation(),
            Self::PinholeRadialK3(r) => r.observation(),
            Self::PinholeRig(r) => r.observation(),
        }
    }
}

impl ResidualFunction for AnyReprojectionResidual {
    fn parameter_dims(&self) -> [usize; 3] {
        [self.kind().num_intrinsics(), EXTRINSICS_DIM, POINT_DIM]
    }

    fn evaluate<T: Scalar>(&self, intrinsics: &[T], extrinsics: &[T], point: &[T]) -> [T; 2] {
        match self {
            Self::Pinhole(r) => r.evaluate(intrinsics, extrinsics, point),
            Self::PinholeRadialK1(r) => r.evaluate(intrinsics, extrinsics, point),
            Self::PinholeRadialK3(r) => r.evaluate(intrinsics, extrinsics, point),
            Self::PinholeRig(r) => r.evaluate(intrinsics, extrinsics, point),
        }
    }
}

impl<M: CameraModel> From<ReprojectionResidual<M>> for AnyReprojectionResidual {
    fn from(residual: ReprojectionResidual<M>) -> Self {
        Self::new(M::KIND, residual.observation())
    }
}
