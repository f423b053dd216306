//! Checked factor interface with forward-mode automatic differentiation.
//!
//! A [`Factor`] validates the parameter blocks handed over by an optimizer and linearizes the
//! residual at the current values. Jacobians are exact: each parameter is seeded in turn with a
//! unit derivative on a [`Dual64`] copy of the blocks and the same residual formula is
//! re-evaluated.

use num_dual::Dual64;

use crate::error::{check_block_len, FactorError, FactorResult};
use crate::residual::{ResidualFunction, RESIDUAL_DIM};

/// Number of parameter blocks connected by a reprojection factor.
pub const NUM_BLOCKS: usize = 3;

/// Output of factor linearization.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearizationResult {
    /// Residual vector (error)
    pub residual: [f64; RESIDUAL_DIM],
    /// Jacobians with respect to the `[intrinsics, extrinsics, point]` blocks.
    ///
    /// Each one is row-major with shape `(RESIDUAL_DIM, block_dim)`.
    pub jacobians: Option<[Vec<f64>; NUM_BLOCKS]>,
}

impl LinearizationResult {
    /// Get a specific Jacobian element of a block (row-major order)
    pub fn jacobian_element(&self, block: usize, row: usize, col: usize) -> Option<f64> {
        let jacobian = self.jacobians.as_ref()?.get(block)?;
        let cols = jacobian.len() / RESIDUAL_DIM;
        if row >= RESIDUAL_DIM || col >= cols {
            return None;
        }
        Some(jacobian[row * cols + col])
    }

    /// Whether the residual and Jacobians only hold finite values.
    pub fn is_finite(&self) -> bool {
        let residual_finite = self.residual.iter().all(|r| r.is_finite());
        let jacobians_finite = self
            .jacobians
            .as_ref()
            .map_or(true, |blocks| blocks.iter().flatten().all(|j| j.is_finite()));
        residual_finite && jacobians_finite
    }
}

/// Trait for factors evaluated by a nonlinear least-squares optimizer.
///
/// # Thread Safety
///
/// Factors must be `Send + Sync` to enable parallel residual/Jacobian evaluation.
pub trait Factor: Send + Sync {
    /// Compute the residual and optionally the Jacobians at the given parameter values.
    ///
    /// # Arguments
    ///
    /// * `params` - The `[intrinsics, extrinsics, point]` blocks.
    /// * `compute_jacobian` - Whether to compute the Jacobians.
    ///
    /// # Errors
    ///
    /// Only malformed blocks are reported. Degenerate geometry is not an error: the returned
    /// values are then non-finite.
    fn linearize(&self, params: &[&[f64]], compute_jacobian: bool)
        -> FactorResult<LinearizationResult>;

    /// Get the dimension of the residual vector.
    fn residual_dim(&self) -> usize {
        RESIDUAL_DIM
    }

    /// Get the number of parameter blocks this factor connects.
    fn num_variables(&self) -> usize {
        NUM_BLOCKS
    }

    /// Get the dimension of a specific parameter block.
    fn variable_dim(&self, idx: usize) -> usize;

    /// Get the total dimension of all connected parameter blocks.
    fn total_dim(&self) -> usize {
        (0..self.num_variables())
            .map(|i| self.variable_dim(i))
            .sum()
    }
}

/// Check the number and lengths of the parameter blocks against the expected dimensions.
pub fn validate_blocks<'a>(
    params: &[&'a [f64]],
    dims: [usize; NUM_BLOCKS],
) -> FactorResult<[&'a [f64]; NUM_BLOCKS]> {
    let blocks: [&[f64]; NUM_BLOCKS] =
        params
            .try_into()
            .map_err(|_| FactorError::WrongBlockCount {
                expected: NUM_BLOCKS,
                actual: params.len(),
            })?;

    for (idx, (block, dim)) in blocks.iter().zip(dims).enumerate() {
        check_block_len(idx, dim, block.len())?;
    }

    Ok(blocks)
}

/// Compute the Jacobians of a residual with forward-mode dual numbers.
///
/// The blocks are assumed to be valid for the residual.
pub fn autodiff_jacobians<F: ResidualFunction + ?Sized>(
    residual: &F,
    blocks: [&[f64]; NUM_BLOCKS],
) -> [Vec<f64>; NUM_BLOCKS] {
    let mut duals = blocks.map(|block| {
        block
            .iter()
            .map(|&x| Dual64::new(x, 0.0))
            .collect::<Vec<_>>()
    });

    let mut jacobians: [Vec<f64>; NUM_BLOCKS] =
        blocks.map(|block| vec![0.0; RESIDUAL_DIM * block.len()]);

    for (block_idx, jacobian) in jacobians.iter_mut().enumerate() {
        let cols = blocks[block_idx].len();
        for col in 0..cols {
            // seed d/dx for a single parameter
            duals[block_idx][col].eps = 1.0;
            let r = residual.evaluate(
                duals[0].as_slice(),
                duals[1].as_slice(),
                duals[2].as_slice(),
            );
            duals[block_idx][col].eps = 0.0;

            jacobian[col] = r[0].eps;
            jacobian[cols + col] = r[1].eps;
        }
    }

    jacobians
}

impl<F: ResidualFunction + Send + Sync> Factor for F {
    fn linearize(
        &self,
        params: &[&[f64]],
        compute_jacobian: bool,
    ) -> FactorResult<LinearizationResult> {
        let blocks = validate_blocks(params, self.parameter_dims())?;

        let residual = self.evaluate(blocks[0], blocks[1], blocks[2]);
        let jacobians = compute_jacobian.then(|| autodiff_jacobians(self, blocks));

        let result = LinearizationResult {
            residual,
            jacobians,
        };

        if result.is_finite() {
            log::trace!("linearized residual {:?}", result.residual);
        } else {
            log::debug!(
                "non-finite linearization (residual {:?}), the point may lie on the camera plane",
                result.residual
            );
        }

        Ok(result)
    }

    fn variable_dim(&self, idx: usize) -> usize {
        self.parameter_dims().get(idx).copied().unwrap_or(0)
    }
}
