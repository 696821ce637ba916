#![no_main]

use arbitrary::Arbitrary;
use fopt_canonical::{BasicPosition, Canonicalizer, CanonicalizerOptions, NonBasicPosition, variables};
use fopt_runtime::RuntimeMode;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Update {
    Swap { basic: u8, nonbasic: u8 },
    Reorder { rotate: u8, reverse: bool },
    Weights(Vec<f64>),
    Rationalize(u16),
}

#[derive(Debug, Arbitrary)]
struct CanonicalInput {
    rows: u8,
    cols: u8,
    hardened: bool,
    check_finite: bool,
    values: Vec<f64>,
    updates: Vec<Update>,
}

fn build_matrix(rows: usize, cols: usize, values: &[f64]) -> Vec<Vec<f64>> {
    let mut matrix = vec![vec![0.0; cols]; rows];
    for (idx, value) in values.iter().copied().take(rows * cols).enumerate() {
        matrix[idx / cols][idx % cols] = value;
    }
    matrix
}

fuzz_target!(|input: CanonicalInput| {
    let rows = usize::from(input.rows % 8);
    let cols = usize::from(input.cols % 12);
    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let options = CanonicalizerOptions {
        mode,
        check_finite: input.check_finite,
        ..CanonicalizerOptions::default()
    };
    let a = build_matrix(rows, cols, &input.values);
    let Ok(mut canon) = Canonicalizer::new(&a, options) else {
        return;
    };
    let rank = canon.num_basic_variables();

    for update in input.updates.into_iter().take(32) {
        let _ = match update {
            Update::Swap { basic, nonbasic } => canon.update_with_swap_basic_variable(
                BasicPosition(usize::from(basic)),
                NonBasicPosition(usize::from(nonbasic)),
            ),
            Update::Reorder { rotate, reverse } => {
                let n = canon.num_variables();
                let mut ordering: Vec<usize> = (0..n).collect();
                ordering.rotate_left(usize::from(rotate) % n);
                if reverse {
                    ordering.reverse();
                }
                canon.update_with_new_ordering(&variables(ordering))
            }
            Update::Weights(weights) => canon.update_with_priority_weights(&weights),
            Update::Rationalize(max_denominator) => canon.rationalize(u32::from(max_denominator)),
        };

        assert_eq!(canon.num_basic_variables(), rank);
        let mut seen = vec![false; canon.num_variables()];
        for v in canon.q() {
            assert!(!seen[v.get()]);
            seen[v.get()] = true;
        }
    }
});
