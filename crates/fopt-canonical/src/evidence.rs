#![forbid(unsafe_code)]

//! Audit records for canonical-form operations.

use fopt_runtime::{MatrixConditionState, RuntimeMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonOperation {
    Factorize,
    Swap { basic: usize, nonbasic: usize },
    Reorder,
    Prioritize,
    Rationalize { max_denominator: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    Rejected { reason: String },
}

/// One ledger record per operation, applied or rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonEvidenceEntry {
    pub component: String,
    pub operation: CanonOperation,
    pub mode: RuntimeMode,
    pub shape: (usize, usize),
    pub rank: usize,
    /// Gauss–Jordan pivots performed by this operation.
    pub pivots: u64,
    pub condition: MatrixConditionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual: Option<f64>,
    pub outcome: UpdateOutcome,
    pub timestamp_ms: u64,
}
