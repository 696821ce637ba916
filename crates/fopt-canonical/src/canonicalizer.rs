#![forbid(unsafe_code)]

use fopt_runtime::{EvidenceLedger, classify_condition, now_unix_ms};
use nalgebra::DMatrix;

use crate::error::{CanonError, UpdateRejected};
use crate::evidence::{CanonEvidenceEntry, CanonOperation, UpdateOutcome};
use crate::factorize::factorize;
use crate::index::{BasicPosition, NonBasicPosition, VariableIndex};
use crate::options::CanonicalizerOptions;
use crate::rational::rationalize;
use crate::reorder::reorder;
use crate::state::{CanonicalState, dmatrix_from_rows};
use crate::swap::swap_basic_variable;
use crate::weights::prioritize;

const COMPONENT: &str = "canonicalizer";

/// Maintains the canonical form `R·A[:,Q] = C` of a coefficient matrix
/// across basis swaps, reorderings and priority re-partitions.
///
/// Every update either completes with the invariants restored or returns an
/// error and leaves the canonical form exactly as it was. Each call, applied
/// or rejected, is recorded in the evidence ledger.
///
/// In [`RuntimeMode::Hardened`](fopt_runtime::RuntimeMode::Hardened) a copy
/// of `A` (relabelled along with the variables) is kept and every update is
/// re-verified against it; an update whose residual exceeds the drift
/// tolerance is rolled back with [`CanonError::InvariantDrift`].
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    state: CanonicalState,
    options: CanonicalizerOptions,
    reference: Option<DMatrix<f64>>,
    ledger: EvidenceLedger<CanonEvidenceEntry>,
}

impl Canonicalizer {
    /// Canonicalize a row-major matrix.
    pub fn new(a: &[Vec<f64>], options: CanonicalizerOptions) -> Result<Self, CanonError> {
        Self::from_matrix(dmatrix_from_rows(a)?, options)
    }

    pub fn from_matrix(a: DMatrix<f64>, options: CanonicalizerOptions) -> Result<Self, CanonError> {
        let mut canonicalizer = Self {
            state: CanonicalState::default(),
            options,
            reference: None,
            ledger: EvidenceLedger::new(options.evidence_capacity),
        };
        canonicalizer.install(a)?;
        Ok(canonicalizer)
    }

    /// Re-factorize from a new matrix, keeping options and ledger.
    ///
    /// On failure the previous canonical form is kept.
    pub fn recompute(&mut self, a: &[Vec<f64>]) -> Result<(), CanonError> {
        self.install(dmatrix_from_rows(a)?)
    }

    fn install(&mut self, a: DMatrix<f64>) -> Result<(), CanonError> {
        let shape = a.shape();
        let state = match factorize(&a, &self.options) {
            Ok(state) => state,
            Err(error) => {
                self.record(CanonOperation::Factorize, shape, 0, 0, None, reject(&error));
                tracing::warn!(component = COMPONENT, %error, "factorization rejected");
                return Err(error);
            }
        };
        let residual = if self.options.mode.verifies_updates() {
            Some(state.residual(&a)?)
        } else {
            None
        };
        let rank = state.num_basic_variables();
        let pivots = state.pivot_count();
        tracing::debug!(
            component = COMPONENT,
            rows = shape.0,
            cols = shape.1,
            rank,
            pivot_ratio = state.pivot_ratio(),
            "canonical form computed"
        );
        self.state = state;
        self.reference = self.options.mode.verifies_updates().then_some(a);
        self.record(
            CanonOperation::Factorize,
            shape,
            rank,
            pivots,
            residual,
            UpdateOutcome::Applied,
        );
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.state.num_variables()
    }

    #[must_use]
    pub fn num_equations(&self) -> usize {
        self.state.num_equations()
    }

    #[must_use]
    pub fn num_basic_variables(&self) -> usize {
        self.state.num_basic_variables()
    }

    #[must_use]
    pub fn num_non_basic_variables(&self) -> usize {
        self.state.num_non_basic_variables()
    }

    #[must_use]
    pub fn r(&self) -> &DMatrix<f64> {
        self.state.r()
    }

    #[must_use]
    pub fn q(&self) -> &[VariableIndex] {
        self.state.q()
    }

    #[must_use]
    pub fn c(&self) -> &DMatrix<f64> {
        self.state.c()
    }

    #[must_use]
    pub fn s(&self) -> DMatrix<f64> {
        self.state.s()
    }

    #[must_use]
    pub fn indices_basic_variables(&self) -> &[VariableIndex] {
        self.state.indices_basic_variables()
    }

    #[must_use]
    pub fn indices_non_basic_variables(&self) -> &[VariableIndex] {
        self.state.indices_non_basic_variables()
    }

    #[must_use]
    pub fn indices_linearly_independent_equations(&self) -> &[usize] {
        self.state.indices_linearly_independent_equations()
    }

    #[must_use]
    pub fn state(&self) -> &CanonicalState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> CanonicalState {
        self.state
    }

    #[must_use]
    pub const fn options(&self) -> &CanonicalizerOptions {
        &self.options
    }

    #[must_use]
    pub const fn ledger(&self) -> &EvidenceLedger<CanonEvidenceEntry> {
        &self.ledger
    }

    // ── Updates ─────────────────────────────────────────────────────

    /// Exchange the basic variable at position `basic` with the non-basic
    /// variable at position `nonbasic`.
    pub fn update_with_swap_basic_variable(
        &mut self,
        basic: BasicPosition,
        nonbasic: NonBasicPosition,
    ) -> Result<(), CanonError> {
        let operation = CanonOperation::Swap {
            basic: basic.get(),
            nonbasic: nonbasic.get(),
        };
        self.apply(operation, None, |state| {
            swap_basic_variable(state, basic, nonbasic)
        })
    }

    /// Relabel variables so that new variable `k` is current variable
    /// `ordering[k]`, preferring earlier variables as basic.
    pub fn update_with_new_ordering(&mut self, ordering: &[VariableIndex]) -> Result<(), CanonError> {
        // Invalid orderings are rejected by `reorder` before this is used.
        let relabelled = self.reference.as_ref().and_then(|a| {
            let columns: Vec<usize> = ordering.iter().map(|v| v.get()).collect();
            columns
                .iter()
                .all(|&c| c < a.ncols())
                .then(|| a.select_columns(columns.iter()))
        });
        self.apply(CanonOperation::Reorder, relabelled, |state| {
            reorder(state, ordering)
        })
    }

    /// Re-partition so that each group is ordered by non-increasing weight.
    pub fn update_with_priority_weights(&mut self, weights: &[f64]) -> Result<(), CanonError> {
        self.apply(CanonOperation::Prioritize, None, |state| {
            prioritize(state, weights)
        })
    }

    /// Round `R` and `S` to the nearest rationals with denominator at most
    /// `max_denominator`.
    pub fn rationalize(&mut self, max_denominator: u32) -> Result<(), CanonError> {
        self.apply(
            CanonOperation::Rationalize { max_denominator },
            None,
            |state| rationalize(state, max_denominator),
        )
    }

    /// Run `update` on the owned state. `relabelled` replaces the reference
    /// matrix when the update renames variables.
    fn apply<F>(
        &mut self,
        operation: CanonOperation,
        relabelled: Option<DMatrix<f64>>,
        update: F,
    ) -> Result<(), CanonError>
    where
        F: FnOnce(CanonicalState) -> Result<CanonicalState, UpdateRejected>,
    {
        let before = std::mem::take(&mut self.state);
        let backup = self.reference.is_some().then(|| before.clone());
        let pivots_before = before.pivot_count();

        let next = match update(before) {
            Ok(next) => next,
            Err(rejected) => {
                let (state, error) = rejected.into_parts();
                self.state = state;
                return Err(self.rejected(operation, None, error));
            }
        };
        let pivots = next.pivot_count() - pivots_before;

        let mut residual = None;
        if let Some(reference) = relabelled.as_ref().or(self.reference.as_ref()) {
            let drift_rtol = self.options.drift_rtol;
            let verdict = next.residual(reference).and_then(|value| {
                let tolerance = next.drift_tolerance(reference, drift_rtol);
                if value <= tolerance {
                    Ok(value)
                } else {
                    Err(CanonError::InvariantDrift {
                        residual: value,
                        tolerance,
                    })
                }
            });
            match verdict {
                Ok(value) => residual = Some(value),
                Err(error) => {
                    // A reference only exists in hardened mode, where a backup is always taken.
                    self.state = backup.unwrap_or(next);
                    let drifted = match error {
                        CanonError::InvariantDrift { residual, .. } => Some(residual),
                        _ => None,
                    };
                    return Err(self.rejected(operation, drifted, error));
                }
            }
        }

        tracing::debug!(
            component = COMPONENT,
            ?operation,
            rank = next.num_basic_variables(),
            pivots,
            "canonical form updated"
        );
        self.state = next;
        if let Some(reference) = relabelled {
            self.reference = Some(reference);
        }
        let shape = self.state.c().shape();
        let rank = self.state.num_basic_variables();
        self.record(operation, shape, rank, pivots, residual, UpdateOutcome::Applied);
        Ok(())
    }

    fn rejected(
        &mut self,
        operation: CanonOperation,
        residual: Option<f64>,
        error: CanonError,
    ) -> CanonError {
        tracing::warn!(component = COMPONENT, ?operation, %error, "canonical form update rejected");
        let shape = self.state.c().shape();
        let rank = self.state.num_basic_variables();
        self.record(operation, shape, rank, 0, residual, reject(&error));
        error
    }

    fn record(
        &mut self,
        operation: CanonOperation,
        shape: (usize, usize),
        rank: usize,
        pivots: u64,
        residual: Option<f64>,
        outcome: UpdateOutcome,
    ) {
        self.ledger.record(CanonEvidenceEntry {
            component: COMPONENT.to_owned(),
            operation,
            mode: self.options.mode,
            shape,
            rank,
            pivots,
            condition: classify_condition(self.state.pivot_ratio()),
            residual,
            outcome,
            timestamp_ms: now_unix_ms(),
        });
    }
}

fn reject(error: &CanonError) -> UpdateOutcome {
    UpdateOutcome::Rejected {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use fopt_runtime::RuntimeMode;

    use super::*;
    use crate::index::variables;

    fn sample_rows() -> Vec<Vec<f64>> {
        vec![vec![4.0, 1.0, 2.0, 0.5], vec![1.0, 3.0, 0.0, 1.5]]
    }

    #[test]
    fn ledger_records_applied_and_rejected_updates() {
        let mut canon =
            Canonicalizer::new(&sample_rows(), CanonicalizerOptions::default()).expect("canon");
        assert_eq!(canon.ledger().len(), 1);
        assert_eq!(
            canon.ledger().latest().map(|e| e.pivots),
            Some(2),
            "initial elimination pivots once per basic variable"
        );

        canon
            .update_with_swap_basic_variable(BasicPosition(0), NonBasicPosition(0))
            .expect("non-zero pivot");
        let latest = canon.ledger().latest().expect("entry");
        assert_eq!(latest.outcome, UpdateOutcome::Applied);
        assert_eq!(latest.pivots, 1);
        assert_eq!(latest.residual, None);

        let before = canon.state().clone();
        let err = canon
            .update_with_swap_basic_variable(BasicPosition(5), NonBasicPosition(0))
            .expect_err("out of range");
        assert!(matches!(err, CanonError::IndexOutOfRange { .. }));
        assert_eq!(canon.state(), &before);
        assert!(matches!(
            canon.ledger().latest().map(|e| &e.outcome),
            Some(UpdateOutcome::Rejected { .. })
        ));
        assert_eq!(canon.ledger().len(), 3);
        assert_eq!(canon.ledger().serialize_jsonl().lines().count(), 3);
    }

    #[test]
    fn ledger_jsonl_parses_back_into_entries() {
        let mut canon =
            Canonicalizer::new(&sample_rows(), CanonicalizerOptions::default()).expect("canon");
        canon
            .update_with_swap_basic_variable(BasicPosition(0), NonBasicPosition(0))
            .expect("non-zero pivot");
        let _ = canon.update_with_priority_weights(&[1.0]);
        canon.rationalize(16).expect("positive denominator");

        let jsonl = canon.ledger().serialize_jsonl();
        let parsed: Vec<CanonEvidenceEntry> = jsonl
            .lines()
            .map(|line| serde_json::from_str(line).expect("entry parses"))
            .collect();
        let recorded: Vec<CanonEvidenceEntry> = canon.ledger().iter().cloned().collect();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed, recorded);
        assert_eq!(parsed[0].component, COMPONENT);
    }

    #[test]
    fn hardened_mode_verifies_every_update() {
        let mut canon =
            Canonicalizer::new(&sample_rows(), CanonicalizerOptions::hardened()).expect("canon");
        canon
            .update_with_new_ordering(&variables([3, 2, 1, 0]))
            .expect("valid ordering");
        canon
            .update_with_priority_weights(&[1.0, 4.0, 2.0, 3.0])
            .expect("valid weights");
        for entry in canon.ledger().iter() {
            assert_eq!(entry.mode, RuntimeMode::Hardened);
            let residual = entry.residual.expect("hardened entries carry a residual");
            assert!(residual < 1e-12);
        }
    }

    #[test]
    fn hardened_mode_rolls_back_drifting_rationalization() {
        let a = vec![vec![3.0, 1.0]];
        let mut canon = Canonicalizer::new(&a, CanonicalizerOptions::hardened()).expect("canon");
        let before = canon.state().clone();
        let err = canon.rationalize(2).expect_err("1/3 is not representable with denominator 2");
        assert!(matches!(err, CanonError::InvariantDrift { .. }));
        assert_eq!(canon.state(), &before);
        assert!(canon.ledger().latest().and_then(|e| e.residual).is_some());

        // Denominator 3 is exact, so the rounded form still verifies.
        canon.rationalize(3).expect("exact rationals");
    }

    #[test]
    fn strict_mode_keeps_no_reference() {
        let mut canon = Canonicalizer::new(&[vec![3.0, 1.0]], CanonicalizerOptions::default())
            .expect("canon");
        canon.rationalize(2).expect("strict mode does not verify");
        assert_eq!(canon.r()[(0, 0)], 0.5);
    }

    #[test]
    fn recompute_replaces_state_and_keeps_ledger() {
        let mut canon =
            Canonicalizer::new(&sample_rows(), CanonicalizerOptions::default()).expect("canon");
        canon
            .recompute(&[vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]])
            .expect("recompute");
        assert_eq!(canon.num_equations(), 2);
        assert_eq!(canon.num_variables(), 3);
        assert_eq!(canon.num_basic_variables(), 1);
        assert_eq!(canon.ledger().len(), 2);

        let before = canon.state().clone();
        let err = canon.recompute(&[vec![1.0, f64::NAN]]).expect_err("non-finite");
        assert_eq!(err, CanonError::NonFiniteInput);
        assert_eq!(canon.state(), &before);
        assert_eq!(canon.ledger().len(), 3);
    }

    #[test]
    fn construction_rejects_degenerate_dimensions() {
        let err = Canonicalizer::new(&[], CanonicalizerOptions::default()).expect_err("empty");
        assert_eq!(err, CanonError::EmptyMatrix { rows: 0, cols: 0 });
        let err = Canonicalizer::new(&[vec![], vec![]], CanonicalizerOptions::default())
            .expect_err("no columns");
        assert_eq!(err, CanonError::EmptyMatrix { rows: 2, cols: 0 });
        let err = Canonicalizer::new(&[vec![1.0], vec![1.0, 2.0]], CanonicalizerOptions::default())
            .expect_err("ragged");
        assert_eq!(err, CanonError::RaggedMatrix);
    }
}
