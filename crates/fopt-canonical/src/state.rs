#![forbid(unsafe_code)]

use nalgebra::DMatrix;

use crate::error::CanonError;
use crate::index::VariableIndex;

/// The complete canonical form `R·A[:,Q] = C` of a coefficient matrix `A`.
///
/// `C` is stored with its columns already in `Q` order, so
/// `C[0..r, 0..r]` is the identity and rows `r..m` are zero. Update functions
/// take the state by value and return either the updated state or an
/// [`UpdateRejected`](crate::UpdateRejected) carrying the untouched one.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalState {
    pub(crate) transform: DMatrix<f64>,
    pub(crate) canonical: DMatrix<f64>,
    pub(crate) q: Vec<VariableIndex>,
    pub(crate) equations: Vec<usize>,
    pub(crate) rank: usize,
    pub(crate) threshold: f64,
    pub(crate) max_pivot: f64,
    pub(crate) min_pivot: f64,
    pub(crate) pivot_count: u64,
}

impl Default for CanonicalState {
    fn default() -> Self {
        Self {
            transform: DMatrix::zeros(0, 0),
            canonical: DMatrix::zeros(0, 0),
            q: Vec::new(),
            equations: Vec::new(),
            rank: 0,
            threshold: 0.0,
            max_pivot: 0.0,
            min_pivot: 0.0,
            pivot_count: 0,
        }
    }
}

impl CanonicalState {
    #[must_use]
    pub fn num_equations(&self) -> usize {
        self.canonical.nrows()
    }

    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.canonical.ncols()
    }

    #[must_use]
    pub fn num_basic_variables(&self) -> usize {
        self.rank
    }

    #[must_use]
    pub fn num_non_basic_variables(&self) -> usize {
        self.num_variables() - self.rank
    }

    /// The row operator `R` (m×m).
    #[must_use]
    pub fn r(&self) -> &DMatrix<f64> {
        &self.transform
    }

    /// The canonical matrix `C` (m×n), columns in `Q` order.
    #[must_use]
    pub fn c(&self) -> &DMatrix<f64> {
        &self.canonical
    }

    /// The `r×(n-r)` block of `C` over the non-basic columns.
    #[must_use]
    pub fn s(&self) -> DMatrix<f64> {
        let (rank, n) = (self.rank, self.num_variables());
        self.canonical
            .view((0, rank), (rank, n - rank))
            .clone_owned()
    }

    /// The column permutation `Q`.
    #[must_use]
    pub fn q(&self) -> &[VariableIndex] {
        &self.q
    }

    #[must_use]
    pub fn indices_basic_variables(&self) -> &[VariableIndex] {
        &self.q[..self.rank]
    }

    #[must_use]
    pub fn indices_non_basic_variables(&self) -> &[VariableIndex] {
        &self.q[self.rank..]
    }

    /// Equation (row) indices of `A` in pivot order; the first `r` are
    /// linearly independent.
    #[must_use]
    pub fn indices_linearly_independent_equations(&self) -> &[usize] {
        &self.equations
    }

    /// Magnitude at or below which an entry is treated as zero.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Reciprocal-condition estimate `min pivot / max pivot` of the initial
    /// elimination.
    #[must_use]
    pub fn pivot_ratio(&self) -> f64 {
        fopt_runtime::pivot_ratio(self.max_pivot, self.min_pivot)
    }

    /// Total number of Gauss–Jordan pivots applied since factorization,
    /// including the initial elimination.
    #[must_use]
    pub fn pivot_count(&self) -> u64 {
        self.pivot_count
    }

    /// Largest entry of `|R·A[:,Q] - C|`, for `A` labelled like `Q`.
    pub fn residual(&self, a: &DMatrix<f64>) -> Result<f64, CanonError> {
        if a.nrows() != self.num_equations() {
            return Err(CanonError::DimensionMismatch {
                what: "reference rows",
                expected: self.num_equations(),
                actual: a.nrows(),
            });
        }
        if a.ncols() != self.num_variables() {
            return Err(CanonError::DimensionMismatch {
                what: "reference columns",
                expected: self.num_variables(),
                actual: a.ncols(),
            });
        }
        let columns: Vec<usize> = self.q.iter().map(|v| v.get()).collect();
        let reordered = a.select_columns(columns.iter());
        let diff = &self.transform * reordered - &self.canonical;
        Ok(max_abs(&diff))
    }

    /// Tolerance applied to [`residual`](Self::residual) for a drift check:
    /// `drift_rtol * (1 + ‖R‖∞ · ‖A‖∞)`.
    #[must_use]
    pub fn drift_tolerance(&self, a: &DMatrix<f64>, drift_rtol: f64) -> f64 {
        drift_rtol * (1.0 + max_row_sum(&self.transform) * max_row_sum(a))
    }
}

pub(crate) fn max_abs(m: &DMatrix<f64>) -> f64 {
    m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

fn max_row_sum(m: &DMatrix<f64>) -> f64 {
    m.row_iter()
        .map(|row| row.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0_f64, f64::max)
}

pub(crate) fn matrix_shape(a: &[Vec<f64>]) -> Result<(usize, usize), CanonError> {
    if a.is_empty() {
        return Ok((0, 0));
    }
    let cols = a[0].len();
    if a.iter().any(|row| row.len() != cols) {
        return Err(CanonError::RaggedMatrix);
    }
    Ok((a.len(), cols))
}

pub(crate) fn dmatrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, CanonError> {
    let (m, n) = matrix_shape(rows)?;
    let mut data = Vec::with_capacity(m * n);
    for row in rows {
        data.extend_from_slice(row);
    }
    Ok(DMatrix::from_row_slice(m, n, &data))
}

/// Convert a dense matrix into row vectors.
#[must_use]
pub fn rows_from_dmatrix(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    let mut out = vec![vec![0.0; m.ncols()]; m.nrows()];
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            out[r][c] = m[(r, c)];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(dmatrix_from_rows(&rows), Err(CanonError::RaggedMatrix));
    }

    #[test]
    fn rows_round_trip_through_dmatrix() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let m = dmatrix_from_rows(&rows).expect("rectangular");
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(rows_from_dmatrix(&m), rows);
    }

    #[test]
    fn norms_use_absolute_values() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, -3.0, 2.0, 0.5]);
        assert_eq!(max_abs(&m), 3.0);
        assert_eq!(max_row_sum(&m), 4.0);
    }

    #[test]
    fn default_state_is_empty() {
        let state = CanonicalState::default();
        assert_eq!(state.num_equations(), 0);
        assert_eq!(state.num_variables(), 0);
        assert!(state.q().is_empty());
        assert_eq!(state.pivot_ratio(), 1.0);
    }
}
