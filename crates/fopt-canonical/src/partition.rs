#![forbid(unsafe_code)]

//! Priority-driven basic/non-basic re-partitioning.
//!
//! A priority assigns every variable a distinct rank, `0` being the most
//! preferred. Basis exchanges are applied until no non-basic variable can
//! replace a basic variable of worse rank; by the matroid exchange property
//! the result is the basis a greedy scan in rank order would select. Both
//! groups are then sorted by rank.

use crate::swap::exchange;
use crate::state::CanonicalState;

/// Exchange basic variables for better-ranked non-basic ones until stable.
///
/// Every exchange strictly lowers the sum of basic ranks, so this
/// terminates. Returns the number of exchanges performed.
pub(crate) fn exchange_toward_priority(state: &mut CanonicalState, priority: &[usize]) -> usize {
    let rank = state.rank;
    let nn = state.num_non_basic_variables();
    if rank == 0 || nn == 0 {
        return 0;
    }

    let mut exchanges = 0;
    loop {
        let mut visit: Vec<usize> = (0..nn).collect();
        visit.sort_by_key(|&j| priority[state.q[rank + j].get()]);

        let mut improved = false;
        for nonbasic in visit {
            let entering = priority[state.q[rank + nonbasic].get()];
            if let Some(basic) = leaving_candidate(state, priority, nonbasic, entering) {
                exchange(state, basic, nonbasic);
                exchanges += 1;
                improved = true;
            }
        }
        if !improved {
            return exchanges;
        }
    }
}

/// Worst-ranked basic row the non-basic column can replace, if any ranks
/// below `entering` and has a pivot above threshold.
fn leaving_candidate(
    state: &CanonicalState,
    priority: &[usize],
    nonbasic: usize,
    entering: usize,
) -> Option<usize> {
    let col = state.rank + nonbasic;
    let mut best: Option<(usize, usize)> = None;
    for basic in 0..state.rank {
        if !(state.canonical[(basic, col)].abs() > state.threshold) {
            continue;
        }
        let leaving = priority[state.q[basic].get()];
        if leaving <= entering {
            continue;
        }
        if best.is_none_or(|(_, worst)| leaving > worst) {
            best = Some((basic, leaving));
        }
    }
    best.map(|(basic, _)| basic)
}

/// Sort both groups by rank.
///
/// Basic rows of `C` and `R` move together with the basic columns, which
/// keeps the identity block intact; dependent-row residue stays in place.
pub(crate) fn sort_groups(state: &mut CanonicalState, priority: &[usize]) {
    let rank = state.rank;
    let (m, n) = state.canonical.shape();

    let mut basic: Vec<usize> = (0..rank).collect();
    basic.sort_by_key(|&pos| priority[state.q[pos].get()]);
    let mut non_basic: Vec<usize> = (rank..n).collect();
    non_basic.sort_by_key(|&pos| priority[state.q[pos].get()]);

    let rows: Vec<usize> = basic.iter().copied().chain(rank..m).collect();
    let columns: Vec<usize> = basic.into_iter().chain(non_basic).collect();

    state.canonical = state
        .canonical
        .select_rows(rows.iter())
        .select_columns(columns.iter());
    state.transform = state.transform.select_rows(rows.iter());
    state.q = columns.iter().map(|&pos| state.q[pos]).collect();
}

#[cfg(test)]
mod tests {
    use nalgebra::DMatrix;

    use super::*;
    use crate::factorize::factorize;
    use crate::index::variables;
    use crate::options::CanonicalizerOptions;

    #[test]
    fn greedy_basis_prefers_low_ranks() {
        let a = DMatrix::from_row_slice(2, 4, &[
            4.0, 1.0, 2.0, 0.5, //
            1.0, 3.0, 0.0, 1.5,
        ]);
        let mut state = factorize(&a, &CanonicalizerOptions::default()).expect("factorize");
        let priority = [3, 2, 1, 0];
        let exchanges = exchange_toward_priority(&mut state, &priority);
        sort_groups(&mut state, &priority);

        assert_eq!(exchanges, 2);
        assert_eq!(state.indices_basic_variables(), &variables([3, 2])[..]);
        assert_eq!(state.indices_non_basic_variables(), &variables([1, 0])[..]);
        assert!(state.residual(&a).expect("shapes") < 1e-12);
        assert_eq!(state.c()[(0, 0)], 1.0);
        assert_eq!(state.c()[(0, 1)], 0.0);
    }

    #[test]
    fn dependent_columns_cannot_displace_basis() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 0.0, 0.0, 0.0, 1.0]);
        let mut state = factorize(&a, &CanonicalizerOptions::default()).expect("factorize");
        assert_eq!(state.indices_basic_variables(), &variables([1, 2])[..]);
        // Variable 0 is parallel to variable 1, which already ranks better.
        let priority = [1, 0, 2];
        assert_eq!(exchange_toward_priority(&mut state, &priority), 0);
        sort_groups(&mut state, &priority);
        assert_eq!(state.indices_basic_variables(), &variables([1, 2])[..]);
        assert_eq!(state.indices_non_basic_variables(), &variables([0])[..]);
    }

    #[test]
    fn sorting_keeps_residue_rows_in_place() {
        let a = DMatrix::from_row_slice(3, 3, &[
            1.0, 0.0, 2.0, //
            0.0, 1.0, 1.0, //
            1.0, 1.0, 3.0,
        ]);
        let mut state = factorize(&a, &CanonicalizerOptions::default()).expect("factorize");
        assert_eq!(state.num_basic_variables(), 2);
        let priority = [2, 1, 0];
        exchange_toward_priority(&mut state, &priority);
        sort_groups(&mut state, &priority);
        assert!(state.c().row(2).iter().all(|v| *v == 0.0));
        assert!(state.residual(&a).expect("shapes") < 1e-12);
        let basic = state.indices_basic_variables();
        assert!(priority[basic[0].get()] < priority[basic[1].get()]);
    }
}
