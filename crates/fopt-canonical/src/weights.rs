#![forbid(unsafe_code)]

use crate::error::{CanonError, UpdateRejected};
use crate::partition::{exchange_toward_priority, sort_groups};
use crate::state::CanonicalState;

/// Re-partition by priority weights, one per variable.
///
/// Variables are ranked by non-increasing weight, ties broken by variable
/// index. Higher-weight variables displace lower-weight basic variables
/// wherever the pivot allows, and both groups end up in non-increasing
/// weight order. Which group a variable lands in still depends on pivot
/// feasibility, so a low-weight variable may stay basic.
pub fn prioritize(state: CanonicalState, weights: &[f64]) -> Result<CanonicalState, UpdateRejected> {
    if let Err(error) = check_weights(weights, state.num_variables()) {
        return Err(UpdateRejected::new(state, error));
    }
    let priority = weight_ranking(weights);
    let mut state = state;
    exchange_toward_priority(&mut state, &priority);
    sort_groups(&mut state, &priority);
    Ok(state)
}

fn check_weights(weights: &[f64], n: usize) -> Result<(), CanonError> {
    if weights.len() != n {
        return Err(CanonError::DimensionMismatch {
            what: "priority weights",
            expected: n,
            actual: weights.len(),
        });
    }
    if let Some((variable, &weight)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
    {
        return Err(CanonError::InvalidWeight { variable, weight });
    }
    Ok(())
}

/// `ranking[v]` is the position of variable `v` in a stable sort by
/// non-increasing weight.
pub(crate) fn weight_ranking(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    let mut ranking = vec![0; weights.len()];
    for (rank, variable) in order.into_iter().enumerate() {
        ranking[variable] = rank;
    }
    ranking
}
