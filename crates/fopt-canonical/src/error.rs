#![forbid(unsafe_code)]

use thiserror::Error;

use crate::state::CanonicalState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanonError {
    #[error("matrix must have at least one row and one column, got {rows}x{cols}")]
    EmptyMatrix { rows: usize, cols: usize },
    #[error("matrix rows must all have equal length")]
    RaggedMatrix,
    #[error("array must not contain infs or NaNs")]
    NonFiniteInput,
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what} index {index} out of range (bound {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },
    #[error("ordering is not a permutation: variable {index} appears more than once")]
    NotAPermutation { index: usize },
    #[error("priority weight of variable {variable} must be finite and non-negative, got {weight}")]
    InvalidWeight { variable: usize, weight: f64 },
    #[error(
        "cannot swap basic position {basic} with non-basic position {nonbasic}: pivot {pivot:e} is within threshold {threshold:e}"
    )]
    SingularPivot {
        basic: usize,
        nonbasic: usize,
        pivot: f64,
        threshold: f64,
    },
    #[error("atol and rtol values must be finite and non-negative")]
    InvalidTolerance,
    #[error("maximum denominator must be positive")]
    InvalidDenominator,
    #[error("canonical form drifted: residual {residual:e} exceeds tolerance {tolerance:e}")]
    InvariantDrift { residual: f64, tolerance: f64 },
}

/// A rejected update: the untouched state handed back with the reason.
#[derive(Debug, Clone)]
pub struct UpdateRejected {
    pub state: CanonicalState,
    pub error: CanonError,
}

impl UpdateRejected {
    pub(crate) fn new(state: CanonicalState, error: CanonError) -> Self {
        Self { state, error }
    }

    #[must_use]
    pub fn into_parts(self) -> (CanonicalState, CanonError) {
        (self.state, self.error)
    }
}

impl std::fmt::Display for UpdateRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "update rejected: {}", self.error)
    }
}

impl std::error::Error for UpdateRejected {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
