#![forbid(unsafe_code)]

//! Gauss–Jordan kernel shared by the factorization and every update.

use nalgebra::DMatrix;

use crate::index::VariableIndex;

/// A pivot candidate in working (row, column) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PivotCandidate {
    pub row: usize,
    pub col: usize,
    pub magnitude: f64,
}

/// Largest-magnitude entry of `work[step.., step..]`.
///
/// Columns are scanned left to right. Equal magnitudes prefer the lower
/// variable index, then the lower original equation index, so the outcome
/// does not depend on the column swaps performed so far.
pub(crate) fn find_full_pivot(
    work: &DMatrix<f64>,
    q: &[VariableIndex],
    equations: &[usize],
    step: usize,
) -> Option<PivotCandidate> {
    let mut best: Option<PivotCandidate> = None;
    for col in step..work.ncols() {
        for row in step..work.nrows() {
            let magnitude = work[(row, col)].abs();
            let better = match best {
                None => true,
                Some(b) if magnitude > b.magnitude => true,
                Some(b) if magnitude == b.magnitude => {
                    (q[col], equations[row]) < (q[b.col], equations[b.row])
                }
                Some(_) => false,
            };
            if better {
                best = Some(PivotCandidate {
                    row,
                    col,
                    magnitude,
                });
            }
        }
    }
    best
}

/// One Gauss–Jordan pivot on `canonical[(row, col)]`.
///
/// Row `row` of both matrices is scaled by the reciprocal pivot and `col` is
/// eliminated from every other row. The same operations are applied to
/// `transform`, so `transform · A = canonical` is preserved. The pivot column
/// is written exactly as the unit vector `e_row`.
pub(crate) fn pivot(
    canonical: &mut DMatrix<f64>,
    transform: &mut DMatrix<f64>,
    row: usize,
    col: usize,
) {
    let scale = 1.0 / canonical[(row, col)];
    scale_row(canonical, row, scale);
    scale_row(transform, row, scale);
    canonical[(row, col)] = 1.0;

    for other in 0..canonical.nrows() {
        if other == row {
            continue;
        }
        let factor = canonical[(other, col)];
        if factor == 0.0 {
            continue;
        }
        subtract_row_multiple(canonical, other, row, factor);
        subtract_row_multiple(transform, other, row, factor);
        canonical[(other, col)] = 0.0;
    }
}

fn scale_row(m: &mut DMatrix<f64>, row: usize, scale: f64) {
    for col in 0..m.ncols() {
        m[(row, col)] *= scale;
    }
}

/// `m[target, :] -= factor * m[source, :]`
fn subtract_row_multiple(m: &mut DMatrix<f64>, target: usize, source: usize, factor: f64) {
    for col in 0..m.ncols() {
        let delta = factor * m[(source, col)];
        m[(target, col)] -= delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::variables;

    #[test]
    fn pivot_produces_unit_column_and_tracks_transform() {
        let a = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 4.0, 1.0, 3.0, 1.0]);
        let mut canonical = a.clone();
        let mut transform = DMatrix::identity(2, 2);
        pivot(&mut canonical, &mut transform, 0, 0);

        assert_eq!(canonical[(0, 0)], 1.0);
        assert_eq!(canonical[(1, 0)], 0.0);
        let diff = &transform * &a - &canonical;
        assert!(diff.iter().all(|v| v.abs() < 1e-14));
    }

    #[test]
    fn full_pivot_picks_largest_magnitude() {
        let work = DMatrix::from_row_slice(2, 3, &[1.0, -7.0, 2.0, 3.0, 0.5, 6.0]);
        let q = variables(0..3);
        let candidate = find_full_pivot(&work, &q, &[0, 1], 0).expect("non-empty");
        assert_eq!((candidate.row, candidate.col), (0, 1));
        assert_eq!(candidate.magnitude, 7.0);
    }

    #[test]
    fn ties_prefer_lowest_variable_then_equation() {
        let work = DMatrix::from_row_slice(2, 3, &[0.0, 5.0, -5.0, 5.0, 0.0, 0.0]);
        // Working column 2 holds variable 0.
        let q = variables([1, 2, 0]);
        let candidate = find_full_pivot(&work, &q, &[0, 1], 0).expect("non-empty");
        assert_eq!((candidate.row, candidate.col), (0, 2));

        let work = DMatrix::from_row_slice(2, 1, &[3.0, -3.0]);
        let candidate = find_full_pivot(&work, &variables([0]), &[4, 1], 0).expect("non-empty");
        assert_eq!(candidate.row, 1);
    }

    #[test]
    fn exhausted_submatrix_has_no_candidate() {
        let work = DMatrix::from_row_slice(1, 1, &[1.0]);
        assert_eq!(find_full_pivot(&work, &variables([0]), &[0], 1), None);
    }
}
