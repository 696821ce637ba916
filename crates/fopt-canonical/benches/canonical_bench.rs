use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fopt_canonical::{
    BasicPosition, CanonicalizerOptions, NonBasicPosition, factorize, prioritize,
    swap_basic_variable,
};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SHAPES: [(usize, usize); 3] = [(8, 20), (32, 80), (64, 160)];

fn make_random(m: usize, n: usize) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    DMatrix::from_fn(m, n, |_, _| rng.gen_range(-1.0..1.0))
}

fn bench_swap_vs_refactorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis_exchange");
    for &(m, n) in &SHAPES {
        let a = make_random(m, n);
        let options = CanonicalizerOptions::default();
        let state = factorize(&a, &options).unwrap();
        let label = format!("{m}x{n}");

        group.bench_with_input(BenchmarkId::new("swap", &label), &state, |bencher, state| {
            bencher.iter_batched(
                || state.clone(),
                |s| swap_basic_variable(s, BasicPosition(0), NonBasicPosition(0)).unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("refactorize", &label), &a, |bencher, a| {
            bencher.iter(|| factorize(a, &options).unwrap());
        });
    }
    group.finish();
}

fn bench_prioritize(c: &mut Criterion) {
    for &(m, n) in &SHAPES {
        let a = make_random(m, n);
        let state = factorize(&a, &CanonicalizerOptions::default()).unwrap();
        let weights: Vec<f64> = (0..n).map(|v| ((v * 7) % n) as f64).collect();
        c.bench_function(&format!("prioritize_{m}x{n}"), |bencher| {
            bencher.iter_batched(
                || state.clone(),
                |s| prioritize(s, &weights).unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, bench_swap_vs_refactorize, bench_prioritize);
criterion_main!(benches);
