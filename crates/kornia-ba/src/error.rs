use thiserror::Error;

/// Error types for the checked parameter-block boundary.
///
/// The residual formulas themselves never fail: degenerate geometry propagates as
/// non-finite values. These errors only report parameter blocks that do not match the
/// layout of a camera model.
#[derive(Debug, Error, PartialEq)]
pub enum FactorError {
    /// Wrong number of parameter blocks passed to a factor
    #[error("Expected {expected} parameter blocks, got {actual}")]
    WrongBlockCount {
        /// Number of blocks the factor connects to
        expected: usize,
        /// Number of blocks provided
        actual: usize,
    },

    /// Parameter block length does not match the model layout
    #[error("Dimension mismatch in parameter block {block}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Index of the offending block
        block: usize,
        /// Expected number of values
        expected: usize,
        /// Number of values provided
        actual: usize,
    },

    /// Camera model name not recognized
    #[error("Unknown camera model: {0}")]
    UnknownCameraModel(String),
}

/// Result type for factor operations.
pub type FactorResult<T> = Result<T, FactorError>;

/// Check the length of a single parameter block.
pub(crate) fn check_block_len(block: usize, expected: usize, actual: usize) -> FactorResult<()> {
    if expected != actual {
        return Err(FactorError::DimensionMismatch {
            block,
            expected,
            actual,
        });
    }
    Ok(())
}
