#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Kornia BA (Bundle Adjustment residuals)
//!
//! Reprojection residuals of calibrated cameras, ready to be plugged into a nonlinear
//! least-squares optimizer.
//!
//! ## Key Features
//!
//! - **Camera Models**: pinhole, pinhole with radial `k1`, pinhole with radial `k1, k2, k3` and
//!   rig-mounted pinhole cameras
//! - **Generic Formulas**: every residual is written once over a [`Scalar`] and evaluated with
//!   `f64` or with dual numbers
//! - **Exact Jacobians**: forward-mode automatic differentiation through the [`Factor`] trait
//! - **Gradient Checking**: comparison of the Jacobians against central differences
//!
//! ## Example: Linearize a residual
//!
//! ```rust
//! use kornia_ba::{Factor, PinholeRadialK1Residual};
//!
//! // observed pixel
//! let residual = PinholeRadialK1Residual::new([330.0, 245.0]);
//!
//! // [focal, ppx, ppy, k1], [rx, ry, rz, tx, ty, tz], [x, y, z]
//! let intrinsics = [1000.0, 320.0, 240.0, -0.05];
//! let extrinsics = [0.01, -0.02, 0.0, 0.1, 0.0, 0.5];
//! let point = [0.2, 0.1, 10.0];
//!
//! let result = residual.linearize(&[&intrinsics, &extrinsics, &point], true)?;
//!
//! println!("Residual: {:?}", result.residual);
//! println!("d(residual)/d(focal): {:?}", result.jacobian_element(0, 0, 0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Example: Mixed camera models
//!
//! ```rust
//! use kornia_ba::{AnyReprojectionResidual, CameraModelKind, ResidualFunction};
//!
//! let kind: CameraModelKind = "pinhole_radial_k3".parse()?;
//! let residual = AnyReprojectionResidual::new(kind, [320.0, 240.0]);
//!
//! assert_eq!(residual.parameter_dims(), [6, 6, 3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use num_dual::DualNum;

/// Distortion models.
pub mod distortion;

/// Checked parameter blocks and automatic differentiation.
pub mod factor;

/// Comparison of Jacobians against finite differences.
pub mod gradient_check;

/// Intrinsic parameter records.
pub mod intrinsics;

/// Camera models and the runtime model selector.
pub mod model;

/// Rigid camera poses.
pub mod pose;

/// Projection of world points to normalized image coordinates.
pub mod projection;

/// Reprojection residuals.
pub mod residual;

/// Camera rigs.
pub mod rig;

/// Angle-axis rotations.
pub mod rotation;

mod error;

pub use error::{FactorError, FactorResult};
pub use factor::{Factor, LinearizationResult};
pub use gradient_check::{check_gradients, GradientCheckParams, GradientCheckReport};
pub use model::{CameraModel, CameraModelKind};
pub use pose::Pose;
pub use residual::{
    AnyReprojectionResidual, PinholeRadialK1Residual, PinholeRadialK3Residual, PinholeResidual,
    PinholeRigResidual, ReprojectionResidual, ResidualFunction,
};

/// Scalar type the residual formulas are written over.
///
/// Implemented by `f64` for plain evaluation and by the `num_dual` dual numbers, which carry
/// derivatives through the same arithmetic.
pub trait Scalar: DualNum<f64> + Copy {}

impl<T: DualNum<f64> + Copy> Scalar for T {}
