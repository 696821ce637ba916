#![forbid(unsafe_code)]

use crate::elimination::pivot;
use crate::error::{CanonError, UpdateRejected};
use crate::index::{BasicPosition, NonBasicPosition};
use crate::state::CanonicalState;

/// Exchange the basic variable at `basic` with the non-basic variable at
/// `nonbasic`.
///
/// Performs a single Gauss–Jordan pivot on `C[basic, r + nonbasic]` in
/// O(m·(m+n)). The pivot must exceed the state's threshold in magnitude;
/// otherwise the state is returned untouched with
/// [`CanonError::SingularPivot`].
pub fn swap_basic_variable(
    state: CanonicalState,
    basic: BasicPosition,
    nonbasic: NonBasicPosition,
) -> Result<CanonicalState, UpdateRejected> {
    if let Err(error) = check_swap(&state, basic, nonbasic) {
        return Err(UpdateRejected::new(state, error));
    }
    let mut state = state;
    exchange(&mut state, basic.get(), nonbasic.get());
    Ok(state)
}

fn check_swap(
    state: &CanonicalState,
    basic: BasicPosition,
    nonbasic: NonBasicPosition,
) -> Result<(), CanonError> {
    let rank = state.num_basic_variables();
    let nn = state.num_non_basic_variables();
    if basic.get() >= rank {
        return Err(CanonError::IndexOutOfRange {
            what: "basic position",
            index: basic.get(),
            bound: rank,
        });
    }
    if nonbasic.get() >= nn {
        return Err(CanonError::IndexOutOfRange {
            what: "non-basic position",
            index: nonbasic.get(),
            bound: nn,
        });
    }
    let candidate = state.canonical[(basic.get(), rank + nonbasic.get())];
    if !(candidate.abs() > state.threshold) {
        return Err(CanonError::SingularPivot {
            basic: basic.get(),
            nonbasic: nonbasic.get(),
            pivot: candidate,
            threshold: state.threshold,
        });
    }
    Ok(())
}

/// Unchecked exchange used by [`swap_basic_variable`] and the partition
/// updates. Callers guarantee the pivot is above threshold.
pub(crate) fn exchange(state: &mut CanonicalState, basic: usize, nonbasic: usize) {
    let col = state.rank + nonbasic;
    pivot(&mut state.canonical, &mut state.transform, basic, col);
    // The pivot column is now e_basic: relabel it as the basic column.
    state.canonical.swap_columns(basic, col);
    state.q.swap(basic, col);
    state.pivot_count += 1;
}
