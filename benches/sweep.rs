use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ghmap::{HorseshoeConfig, NoopProgress, fit_graphical_horseshoe_with_observer};
use ndarray::Array2;
use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_observations(n: usize, p: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(0x6A5_F64 + p as u64);
    Array2::from_shape_fn((n, p), |_| rng.sample::<f64, _>(Standard) - 0.5)
}

fn benchmark_fit(c: &mut Criterion) {
    let sizes = [10_usize, 25, 50];
    let n = 200;
    let datasets: Vec<_> = sizes
        .iter()
        .map(|&p| (p, random_observations(n, p)))
        .collect();

    let config = HorseshoeConfig {
        max_iter: 20,
        verbose: -1,
        ..HorseshoeConfig::default()
    };

    let mut group = c.benchmark_group("graphical_horseshoe_fit");
    for (p, x) in datasets.iter() {
        group.throughput(Throughput::Elements((*p * *p) as u64));
        group.bench_with_input(BenchmarkId::new("fit", p), x, |b, input| {
            b.iter(|| {
                let fit = fit_graphical_horseshoe_with_observer(
                    black_box(input.view()),
                    &config,
                    &mut NoopProgress,
                )
                .unwrap();
                black_box(fit.iterations);
            });
        });
    }
    group.finish();
}

criterion_group!(graphical_horseshoe, benchmark_fit);
criterion_main!(graphical_horseshoe);
