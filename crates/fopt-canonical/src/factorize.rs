#![forbid(unsafe_code)]

use nalgebra::DMatrix;

use crate::elimination::{find_full_pivot, pivot};
use crate::error::CanonError;
use crate::index::VariableIndex;
use crate::options::CanonicalizerOptions;
use crate::state::{CanonicalState, max_abs};

/// Compute the canonical form of `a` by Gauss–Jordan elimination with full
/// pivoting.
///
/// Elimination stops as soon as the largest remaining candidate is at or
/// below the pivot threshold; the number of accepted pivots is the rank `r`.
/// Rank deficiency is never an error. Non-basic variables follow the basic
/// ones in increasing variable index.
pub fn factorize(
    a: &DMatrix<f64>,
    options: &CanonicalizerOptions,
) -> Result<CanonicalState, CanonError> {
    let (m, n) = a.shape();
    if m == 0 || n == 0 {
        return Err(CanonError::EmptyMatrix { rows: m, cols: n });
    }
    if options.must_check_finite() && a.iter().any(|v| !v.is_finite()) {
        return Err(CanonError::NonFiniteInput);
    }
    let threshold = options.pivot_threshold(m, n, max_abs(a))?;

    let mut work = a.clone();
    let mut transform = DMatrix::<f64>::identity(m, m);
    let mut q: Vec<VariableIndex> = (0..n).map(VariableIndex).collect();
    let mut equations: Vec<usize> = (0..m).collect();
    let mut max_pivot = 0.0_f64;
    let mut min_pivot = 0.0_f64;

    let mut rank = 0;
    while rank < m.min(n) {
        let Some(candidate) = find_full_pivot(&work, &q, &equations, rank) else {
            break;
        };
        // NaN magnitudes also stop here when finite checks are disabled.
        if !(candidate.magnitude > threshold) {
            break;
        }
        work.swap_rows(rank, candidate.row);
        transform.swap_rows(rank, candidate.row);
        equations.swap(rank, candidate.row);
        work.swap_columns(rank, candidate.col);
        q.swap(rank, candidate.col);

        pivot(&mut work, &mut transform, rank, rank);

        if rank == 0 {
            max_pivot = candidate.magnitude;
        }
        min_pivot = candidate.magnitude;
        rank += 1;
    }

    // Dependent-row residue: everything left is within the threshold.
    work.rows_mut(rank, m - rank).fill(0.0);

    let mut state = CanonicalState {
        transform,
        canonical: work,
        q,
        equations,
        rank,
        threshold,
        max_pivot,
        min_pivot,
        pivot_count: rank as u64,
    };
    sort_non_basic_by_index(&mut state);
    Ok(state)
}

fn sort_non_basic_by_index(state: &mut CanonicalState) {
    let rank = state.rank;
    let mut tail: Vec<usize> = (rank..state.q.len()).collect();
    tail.sort_by_key(|&pos| state.q[pos]);
    let columns: Vec<usize> = (0..rank).chain(tail).collect();
    state.canonical = state.canonical.select_columns(columns.iter());
    state.q = columns.iter().map(|&pos| state.q[pos]).collect();
}
