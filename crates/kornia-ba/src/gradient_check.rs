//! Check the exact Jacobians of a residual against central differences.

use serde::{Deserialize, Serialize};

use crate::error::FactorResult;
use crate::factor::{validate_blocks, Factor, NUM_BLOCKS};
use crate::residual::{ResidualFunction, RESIDUAL_DIM};

/// Parameters controlling the gradient check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientCheckParams {
    /// Finite difference step relative to the parameter magnitude.
    pub relative_step: f64,
    /// Largest accepted relative error between the two Jacobians.
    pub relative_tolerance: f64,
}

impl Default for GradientCheckParams {
    fn default() -> Self {
        Self {
            relative_step: 1e-6,
            relative_tolerance: 1e-4,
        }
    }
}

/// One Jacobian entry compared by the gradient check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JacobianEntry {
    /// Parameter block index
    pub block: usize,
    /// Residual row
    pub row: usize,
    /// Parameter index inside the block
    pub col: usize,
    /// Value from automatic differentiation
    pub analytic: f64,
    /// Value from central differences
    pub numeric: f64,
}

impl JacobianEntry {
    /// Relative error `|a - n| / max(|a|, |n|, 1)`.
    ///
    /// NaN values give an infinite error.
    pub fn relative_error(&self) -> f64 {
        let error = (self.analytic - self.numeric).abs()
            / self.analytic.abs().max(self.numeric.abs()).max(1.0);
        if error.is_nan() {
            f64::INFINITY
        } else {
            error
        }
    }
}

/// Result of a gradient check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientCheckReport {
    /// Largest relative error over all the entries
    pub max_error: f64,
    /// The entry with the largest relative error, if any entry was compared
    pub worst: Option<JacobianEntry>,
    /// Whether the largest error is within the tolerance
    pub passed: bool,
}

/// Compute the Jacobians of a residual with central differences.
///
/// Each parameter `x` is perturbed by `h = relative_step · max(|x|, 1)`.
///
/// # Returns
///
/// The row-major `(2, block_dim)` Jacobians of the `[intrinsics, extrinsics, point]` blocks.
pub fn numeric_jacobians<F: ResidualFunction + ?Sized>(
    residual: &F,
    params: &[&[f64]],
    relative_step: f64,
) -> FactorResult<[Vec<f64>; NUM_BLOCKS]> {
    let blocks = validate_blocks(params, residual.parameter_dims())?;

    let mut perturbed = blocks.map(|block| block.to_vec());
    let mut jacobians: [Vec<f64>; NUM_BLOCKS] =
        blocks.map(|block| vec![0.0; RESIDUAL_DIM * block.len()]);

    for (block_idx, jacobian) in jacobians.iter_mut().enumerate() {
        let cols = blocks[block_idx].len();
        for col in 0..cols {
            let x = blocks[block_idx][col];
            let h = relative_step * x.abs().max(1.0);

            perturbed[block_idx][col] = x + h;
            let r_plus = evaluate_blocks(residual, &perturbed);
            perturbed[block_idx][col] = x - h;
            let r_minus = evaluate_blocks(residual, &perturbed);
            perturbed[block_idx][col] = x;

            for row in 0..RESIDUAL_DIM {
                jacobian[row * cols + col] = (r_plus[row] - r_minus[row]) / (2.0 * h);
            }
        }
    }

    Ok(jacobians)
}

fn evaluate_blocks<F: ResidualFunction + ?Sized>(
    residual: &F,
    blocks: &[Vec<f64>; NUM_BLOCKS],
) -> [f64; RESIDUAL_DIM] {
    residual.evaluate(blocks[0].as_slice(), blocks[1].as_slice(), blocks[2].as_slice())
}

/// Compare the Jacobians of automatic differentiation with central differences.
///
/// # Arguments
///
/// * `residual` - The residual to check.
/// * `params` - The `[intrinsics, extrinsics, point]` blocks to linearize at.
/// * `check_params` - The finite difference step and the tolerance.
///
/// # Returns
///
/// A report with the worst entry. Non-finite Jacobians never pass.
pub fn check_gradients<F: ResidualFunction + Send + Sync>(
    residual: &F,
    params: &[&[f64]],
    check_params: &GradientCheckParams,
) -> FactorResult<GradientCheckReport> {
    let linearization = residual.linearize(params, true)?;
    let numeric = numeric_jacobians(residual, params, check_params.relative_step)?;

    let mut worst: Option<JacobianEntry> = None;
    let mut max_error = 0.0f64;

    if let Some(analytic) = linearization.jacobians.as_ref() {
        for (block, (a, n)) in analytic.iter().zip(numeric.iter()).enumerate() {
            let cols = a.len() / RESIDUAL_DIM;
            for (idx, (&analytic, &numeric)) in a.iter().zip(n.iter()).enumerate() {
                let entry = JacobianEntry {
                    block,
                    row: idx / cols,
                    col: idx % cols,
                    analytic,
                    numeric,
                };
                let error = entry.relative_error();
                if worst.is_none() || error > max_error {
                    max_error = error;
                    worst = Some(entry);
                }
            }
        }
    }

    let passed = max_error <= check_params.relative_tolerance;
    if !passed {
        log::warn!(
            "gradient check failed: max relative error {max_error:e} at {:?}",
            worst
        );
    } else {
        log::debug!("gradient check passed: max relative error {max_error:e}");
    }

    Ok(GradientCheckReport {
        max_error,
        worst,
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactorError;
    use crate::residual::{
        PinholeRadialK1Residual, PinholeRadialK3Residual, PinholeResidual, PinholeRigResidual,
    };
    use approx::assert_relative_eq;

    const EXTRINSICS: [f64; 6] = [0.1, -0.05, 0.2, 0.3, -0.2, 5.0];
    const POINT: [f64; 3] = [0.4, -0.3, 2.0];

    /// Residual whose evaluation ignores the `T` arithmetic for the point block.
    struct BrokenResidual;

    impl ResidualFunction for BrokenResidual {
        fn parameter_dims(&self) -> [usize; 3] {
            [1, 1, 1]
        }

        fn evaluate<T: crate::Scalar>(
            &self,
            intrinsics: &[T],
            extrinsics: &[T],
            point: &[T],
        ) -> [T; 2] {
            // the second entry depends on `point` only through its real part
            let frozen = T::from(point[0].re());
            [intrinsics[0] * extrinsics[0], frozen * frozen]
        }
    }

    #[test]
    fn test_default_params() {
        let params = GradientCheckParams::default();
        assert_eq!(params.relative_step, 1e-6);
        assert_eq!(params.relative_tolerance, 1e-4);
    }

    #[test]
    fn test_relative_error() {
        let entry = JacobianEntry {
            block: 0,
            row: 0,
            col: 0,
            analytic: 200.0,
            numeric: 202.0,
        };
        assert_relative_eq!(entry.relative_error(), 2.0 / 202.0, epsilon = 1e-12);

        let small = JacobianEntry {
            analytic: 1e-8,
            numeric: 0.0,
            ..entry
        };
        assert_relative_eq!(small.relative_error(), 1e-8, epsilon = 1e-20);

        let nan = JacobianEntry {
            numeric: f64::NAN,
            ..entry
        };
        assert!(nan.relative_error().is_infinite());
    }

    #[test]
    fn test_numeric_jacobian_of_linear_intrinsics() -> Result<(), FactorError> {
        // the residual is linear in the principal point
        let residual = PinholeResidual::new([0.0, 0.0]);
        let intrinsics = [800.0, 320.0, 240.0];
        let jacobians = numeric_jacobians(&residual, &[&intrinsics, &EXTRINSICS, &POINT], 1e-6)?;
        assert_eq!(jacobians[0].len(), 6);
        assert_relative_eq!(jacobians[0][1], 1.0, epsilon = 1e-6);
        assert_relative_eq!(jacobians[0][2], 0.0, epsilon = 1e-6);
        assert_relative_eq!(jacobians[0][4], 0.0, epsilon = 1e-6);
        assert_relative_eq!(jacobians[0][5], 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_numeric_jacobians_rejects_bad_blocks() {
        let residual = PinholeResidual::new([0.0, 0.0]);
        let result = numeric_jacobians(&residual, &[&[800.0, 320.0], &EXTRINSICS, &POINT], 1e-6);
        assert!(matches!(
            result,
            Err(FactorError::DimensionMismatch { block: 0, .. })
        ));
    }

    #[test]
    fn test_check_gradients_all_models() -> Result<(), FactorError> {
        let params = GradientCheckParams::default();
        let observation = [310.0, 250.0];

        let report = check_gradients(
            &PinholeResidual::new(observation),
            &[&[800.0, 320.0, 240.0], &EXTRINSICS, &POINT],
            &params,
        )?;
        assert!(report.passed, "{report:?}");

        let report = check_gradients(
            &PinholeRadialK1Residual::new(observation),
            &[&[800.0, 320.0, 240.0, -0.1], &EXTRINSICS, &POINT],
            &params,
        )?;
        assert!(report.passed, "{report:?}");

        let report = check_gradients(
            &PinholeRadialK3Residual::new(observation),
            &[&[800.0, 320.0, 240.0, -0.1, 0.02, -0.003], &EXTRINSICS, &POINT],
            &params,
        )?;
        assert!(report.passed, "{report:?}");

        let report = check_gradients(
            &PinholeRigResidual::new(observation),
            &[
                &[800.0, 320.0, 240.0, 0.02, -0.01, 0.03, 0.1, 0.05, 0.2],
                &EXTRINSICS,
                &POINT,
            ],
            &params,
        )?;
        assert!(report.passed, "{report:?}");
        assert!(report.worst.is_some());

        Ok(())
    }

    #[test]
    fn test_check_gradients_detects_wrong_jacobian() -> Result<(), FactorError> {
        let report = check_gradients(
            &BrokenResidual,
            &[&[2.0], &[3.0], &[4.0]],
            &GradientCheckParams::default(),
        )?;
        assert!(!report.passed);
        let worst = report.worst.expect("entries were compared");
        assert_eq!((worst.block, worst.row, worst.col), (2, 1, 0));
        assert_eq!(worst.analytic, 0.0);
        assert_relative_eq!(worst.numeric, 8.0, epsilon = 1e-4);
        Ok(())
    }
}
