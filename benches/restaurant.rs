use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pyp::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

const N_DISHES: u32 = 1_000;

fn seated(n: u32) -> (Restaurant<u32>, Vec<u32>) {
    let mut rng = Xoshiro256Plus::seed_from_u64(1337);
    let mut crp = Restaurant::with_priors(
        Some(Beta::new(1.0, 1.0).unwrap()),
        Some(Gamma::new(1.0, 1.0).unwrap()),
        0.8,
        1.0,
    )
    .unwrap();
    // heavy-tailed dish frequencies
    let data: Vec<u32> = (1..=n).map(|i| (n / i) % N_DISHES).collect();
    for &x in &data {
        crp.increment(x, 1.0 / N_DISHES as f64, &mut rng);
    }
    (crp, data)
}

fn bench_gibbs_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("gibbs_sweep");
    for n in [1_000, 10_000] {
        group.bench_function(format!("n={}", n), |b| {
            let (mut crp, data) = seated(n);
            let mut rng = Xoshiro256Plus::seed_from_u64(1776);
            b.iter(|| {
                for &x in &data {
                    crp.decrement(&x, &mut rng);
                    crp.increment(x, 1.0 / N_DISHES as f64, &mut rng);
                }
            })
        });
    }
    group.finish();
}

fn bench_log_likelihood(c: &mut Criterion) {
    let (crp, _) = seated(10_000);
    c.bench_function("log_likelihood", |b| {
        b.iter(|| black_box(crp.log_likelihood()))
    });
}

fn bench_resample(c: &mut Criterion) {
    let (crp, _) = seated(10_000);
    c.bench_function("resample_hyperparameters", |b| {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        b.iter_batched(
            || crp.clone(),
            |mut crp| crp.resample_hyperparameters(&mut rng).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    restaurant_benches,
    bench_gibbs_sweep,
    bench_log_likelihood,
    bench_resample,
);
criterion_main!(restaurant_benches);
