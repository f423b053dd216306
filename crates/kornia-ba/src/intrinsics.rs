//! Intrinsic parameter records and the mapping from normalized to pixel coordinates.
//!
//! The records give names to the values of the flat intrinsic blocks handled by the
//! optimizer. The flattening order is fixed:
//!
//! | model            | layout                                  |
//! |------------------|-----------------------------------------|
//! | pinhole          | `[focal, ppx, ppy]`                     |
//! | pinhole + k1     | `[focal, ppx, ppy, k1]`                 |
//! | pinhole + k1..k3 | `[focal, ppx, ppy, k1, k2, k3]`         |
//! | pinhole rig      | `[focal, ppx, ppy, rx, ry, rz, tx, ty, tz]` |

use serde::{Deserialize, Serialize};

use crate::distortion::{Distortion, RadialK1, RadialK3};
use crate::error::{check_block_len, FactorResult};
use crate::Scalar;

/// Offset of the focal length in every intrinsic block.
pub const OFFSET_FOCAL_LENGTH: usize = 0;
/// Offset of the principal point x coordinate in every intrinsic block.
pub const OFFSET_PRINCIPAL_POINT_X: usize = 1;
/// Offset of the principal point y coordinate in every intrinsic block.
pub const OFFSET_PRINCIPAL_POINT_Y: usize = 2;
/// Offset of the first radial coefficient in the distorted models.
pub const OFFSET_DISTO_K1: usize = 3;
/// Offset of the second radial coefficient in the three-coefficient model.
pub const OFFSET_DISTO_K2: usize = 4;
/// Offset of the third radial coefficient in the three-coefficient model.
pub const OFFSET_DISTO_K3: usize = 5;

/// Pinhole intrinsics with a single focal length and a principal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeIntrinsics<T = f64> {
    /// The focal length in pixels, shared by both axes
    pub focal: T,
    /// The principal point in pixels (ppx, ppy)
    pub principal_point: [T; 2],
}

impl<T: Scalar> PinholeIntrinsics<T> {
    /// Number of values in the flat block.
    pub const LEN: usize = 3;

    /// Creates the intrinsics from a focal length and a principal point.
    pub fn new(focal: T, principal_point: [T; 2]) -> Self {
        Self {
            focal,
            principal_point,
        }
    }

    /// Reads the leading `[focal, ppx, ppy]` values of an intrinsic block.
    ///
    /// Every model shares this prefix, so longer blocks are accepted.
    pub fn from_block(block: &[T]) -> Self {
        debug_assert!(block.len() >= Self::LEN, "intrinsics must have 3 params");
        Self::new(
            block[OFFSET_FOCAL_LENGTH],
            [
                block[OFFSET_PRINCIPAL_POINT_X],
                block[OFFSET_PRINCIPAL_POINT_Y],
            ],
        )
    }

    /// Reads the intrinsics from a block of exactly 3 values.
    pub fn try_from_block(block: &[T]) -> FactorResult<Self> {
        check_block_len(0, Self::LEN, block.len())?;
        Ok(Self::from_block(block))
    }

    /// Flattens the intrinsics into `[focal, ppx, ppy]`.
    pub fn to_block(&self) -> [T; 3] {
        [self.focal, self.principal_point[0], self.principal_point[1]]
    }

    /// Maps (possibly distorted) normalized coordinates to pixel coordinates.
    ///
    /// `u = ppx + focal · x_d`, `v = ppy + focal · y_d`
    pub fn to_pixel(&self, normalized: [T; 2]) -> [T; 2] {
        [
            self.principal_point[0] + self.focal * normalized[0],
            self.principal_point[1] + self.focal * normalized[1],
        ]
    }
}

/// Pinhole intrinsics with one radial distortion coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialK1Intrinsics<T = f64> {
    /// Focal length and principal point
    pub pinhole: PinholeIntrinsics<T>,
    /// Radial distortion
    pub distortion: RadialK1<T>,
}

impl<T: Scalar> RadialK1Intrinsics<T> {
    /// Number of values in the flat block.
    pub const LEN: usize = 4;

    /// Reads the intrinsics from a `[focal, ppx, ppy, k1]` block.
    pub fn from_block(block: &[T]) -> Self {
        debug_assert_eq!(block.len(), Self::LEN, "intrinsics must have 4 params");
        Self {
            pinhole: PinholeIntrinsics::from_block(block),
            distortion: RadialK1::new(block[OFFSET_DISTO_K1]),
        }
    }

    /// Reads the intrinsics from a block, validating its length.
    pub fn try_from_block(block: &[T]) -> FactorResult<Self> {
        check_block_len(0, Self::LEN, block.len())?;
        Ok(Self::from_block(block))
    }

    /// Flattens the intrinsics into `[focal, ppx, ppy, k1]`.
    pub fn to_block(&self) -> [T; 4] {
        let [f, ppx, ppy] = self.pinhole.to_block();
        [f, ppx, ppy, self.distortion.k1]
    }

    /// Distorts normalized coordinates and maps them to pixels.
    pub fn to_pixel(&self, normalized: [T; 2]) -> [T; 2] {
        self.pinhole.to_pixel(self.distortion.distort(normalized))
    }
}

/// Pinhole intrinsics with three radial distortion coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialK3Intrinsics<T = f64> {
    /// Focal length and principal point
    pub pinhole: PinholeIntrinsics<T>,
    /// Radial distortion
    pub distortion: RadialK3<T>,
}

impl<T: Scalar> RadialK3Intrinsics<T> {
    /// Number of values in the flat block.
    pub const LEN: usize = 6;

    /// Reads the intrinsics from a `[focal, ppx, ppy, k1, k2, k3]` block.
    pub fn from_block(block: &[T]) -> Self {
        debug_assert_eq!(block.len(), Self::LEN, "intrinsics must have 6 params");
        Self {
            pinhole: PinholeIntrinsics::from_block(block),
            distortion: RadialK3::new(
                block[OFFSET_DISTO_K1],
                block[OFFSET_DISTO_K2],
                block[OFFSET_DISTO_K3],
            ),
        }
    }

    /// Reads the intrinsics from a block, validating its length.
    pub fn try_from_block(block: &[T]) -> FactorResult<Self> {
        check_block_len(0, Self::LEN, block.len())?;
        Ok(Self::from_block(block))
    }

    /// Flattens the intrinsics into `[focal, ppx, ppy, k1, k2, k3]`.
    pub fn to_block(&self) -> [T; 6] {
        let [f, ppx, ppy] = self.pinhole.to_block();
        let d = self.distortion;
        [f, ppx, ppy, d.k1, d.k2, d.k3]
    }

    /// Distorts normalized coordinates and maps them to pixels.
    pub fn to_pixel(&self, normalized: [T; 2]) -> [T; 2] {
        self.pinhole.to_pixel(self.distortion.distort(normalized))
    }
}
