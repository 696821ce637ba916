#![forbid(unsafe_code)]

//! Pivot-ratio condition classification.
//!
//! A full-pivoting elimination accepts pivots in non-increasing magnitude, so
//! the ratio `|smallest accepted pivot| / |largest accepted pivot|` is a cheap
//! lower bound on the reciprocal condition of the basic block.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixConditionState {
    WellConditioned,
    ModerateCondition,
    IllConditioned,
    NearSingular,
}

/// Classify a reciprocal-condition estimate.
///
/// Non-finite or non-positive estimates are treated as near-singular.
#[must_use]
pub fn classify_condition(rcond: f64) -> MatrixConditionState {
    if !rcond.is_finite() || rcond <= 0.0 {
        MatrixConditionState::NearSingular
    } else if rcond > 1e-4 {
        MatrixConditionState::WellConditioned
    } else if rcond > 1e-8 {
        MatrixConditionState::ModerateCondition
    } else if rcond > 1e-14 {
        MatrixConditionState::IllConditioned
    } else {
        MatrixConditionState::NearSingular
    }
}

/// Reciprocal condition from the extreme pivot magnitudes of an elimination.
/// An empty elimination (rank zero) is reported as perfectly conditioned.
#[must_use]
pub fn pivot_ratio(max_pivot: f64, min_pivot: f64) -> f64 {
    if max_pivot == 0.0 {
        return 1.0;
    }
    min_pivot / max_pivot
}
