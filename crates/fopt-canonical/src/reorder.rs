#![forbid(unsafe_code)]

use crate::error::{CanonError, UpdateRejected};
use crate::index::VariableIndex;
use crate::partition::{exchange_toward_priority, sort_groups};
use crate::state::CanonicalState;

/// Relabel the variables by `ordering` and re-partition in that order.
///
/// `ordering[k]` names the current variable that becomes variable `k`, so
/// afterwards the canonical form holds against `A[:, ordering]`. Variables
/// earlier in `ordering` are preferred as basic; both groups end up in
/// increasing (new) index order. Only basis exchanges are used, so the rank
/// is unchanged.
pub fn reorder(
    state: CanonicalState,
    ordering: &[VariableIndex],
) -> Result<CanonicalState, UpdateRejected> {
    let inverse = match inverse_permutation(ordering, state.num_variables()) {
        Ok(inverse) => inverse,
        Err(error) => return Err(UpdateRejected::new(state, error)),
    };

    let mut state = state;
    for variable in &mut state.q {
        *variable = VariableIndex(inverse[variable.get()]);
    }
    let priority: Vec<usize> = (0..inverse.len()).collect();
    exchange_toward_priority(&mut state, &priority);
    sort_groups(&mut state, &priority);
    Ok(state)
}

/// `inverse[ordering[k]] = k`, validating that `ordering` is a permutation
/// of `0..n`.
pub(crate) fn inverse_permutation(
    ordering: &[VariableIndex],
    n: usize,
) -> Result<Vec<usize>, CanonError> {
    if ordering.len() != n {
        return Err(CanonError::DimensionMismatch {
            what: "ordering",
            expected: n,
            actual: ordering.len(),
        });
    }
    let mut inverse = vec![usize::MAX; n];
    for (k, variable) in ordering.iter().enumerate() {
        let index = variable.get();
        if index >= n {
            return Err(CanonError::IndexOutOfRange {
                what: "variable",
                index,
                bound: n,
            });
        }
        if inverse[index] != usize::MAX {
            return Err(CanonError::NotAPermutation { index });
        }
        inverse[index] = k;
    }
    Ok(inverse)
}
