#![forbid(unsafe_code)]

//! Nearest-rational rounding of a canonical form.
//!
//! When `A` holds rationals with small denominators, so do `R` and `S`.
//! Rounding every entry to the nearest fraction with a bounded denominator
//! removes the floating-point noise accumulated by repeated pivoting.

use crate::error::{CanonError, UpdateRejected};
use crate::state::CanonicalState;

/// Nearest fraction `numerator / denominator` to `x` with
/// `1 <= denominator <= max_denominator`, found by a Farey-sequence search on
/// the fractional part.
///
/// Returns `None` when `max_denominator` is zero or `x` is not finite.
#[must_use]
pub fn nearest_rational(x: f64, max_denominator: u32) -> Option<(i64, i64)> {
    if max_denominator == 0 || !x.is_finite() {
        return None;
    }
    let whole = x.floor();
    // Beyond 2^53 every f64 is an integer; `as` saturates past i64.
    if whole.abs() >= 9.007_199_254_740_992e15 {
        return Some((whole as i64, 1));
    }
    let (num, den) = farey(x - whole, i64::from(max_denominator));
    Some((whole as i64 * den + num, den))
}

/// Nearest fraction in the Farey sequence of order `n` to `x` in `[0, 1)`.
///
/// Walks the Stern–Brocot tree, taking each run of same-direction steps at
/// once, so the cost is logarithmic in `n`.
fn farey(x: f64, n: i64) -> (i64, i64) {
    let (mut a, mut b) = (0_i64, 1_i64);
    let (mut c, mut d) = (1_i64, 1_i64);
    while b + d <= n {
        let mediant = (a + c) as f64 / (b + d) as f64;
        if x == mediant {
            return (a + c, b + d);
        }
        if x > mediant {
            let k = longest_run((n - b) / d, |j| ((a + j * c) as f64 / (b + j * d) as f64) < x);
            a += k * c;
            b += k * d;
        } else {
            let k = longest_run((n - d) / b, |j| ((c + j * a) as f64 / (d + j * b) as f64) > x);
            c += k * a;
            d += k * b;
        }
    }
    if x - a as f64 / b as f64 <= c as f64 / d as f64 - x {
        (a, b)
    } else {
        (c, d)
    }
}

/// Largest `j` in `1..=limit` with `holds(j)`. `holds(1)` is known to be
/// true and `holds` is monotone, so a bisection finds the end of the run.
fn longest_run(limit: i64, holds: impl Fn(i64) -> bool) -> i64 {
    let (mut lo, mut hi) = (1, limit);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if holds(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn round_to_rational(x: f64, max_denominator: u32) -> f64 {
    nearest_rational(x, max_denominator).map_or(x, |(num, den)| num as f64 / den as f64)
}

/// Round `R` and the `S` block of `C` to nearest rationals.
///
/// The identity block and the dependent-row residue are exact already and
/// are left alone.
pub fn rationalize(
    state: CanonicalState,
    max_denominator: u32,
) -> Result<CanonicalState, UpdateRejected> {
    if max_denominator == 0 {
        return Err(UpdateRejected::new(state, CanonError::InvalidDenominator));
    }
    let mut state = state;
    state
        .transform
        .apply(|v| *v = round_to_rational(*v, max_denominator));
    let (rank, n) = (state.rank, state.num_variables());
    state
        .canonical
        .view_mut((0, rank), (rank, n - rank))
        .apply(|v| *v = round_to_rational(*v, max_denominator));
    Ok(state)
}
