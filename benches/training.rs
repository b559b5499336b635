use autosense::training::{default_candidates, TrainedModel};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_regression_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);
    let y = Array1::from_iter(x.rows().into_iter().map(|row| row.sum()));
    let noise = Array1::from_shape_fn(n_rows, |_| rng.gen::<f64>() * 0.1);
    (x, y + noise)
}

fn bench_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_fit");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [500, 2000].iter() {
        let (x, y) = create_regression_data(*n_rows, 12);

        for candidate in default_candidates() {
            group.bench_with_input(
                BenchmarkId::new(candidate.name.replace(' ', "_"), n_rows),
                &(&x, &y),
                |b, (x, y)| {
                    b.iter(|| {
                        let mut model: TrainedModel = candidate.clone();
                        model.model.fit(black_box(x), black_box(y)).unwrap();
                        model
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    let (train_x, train_y) = create_regression_data(2000, 12);
    for candidate in default_candidates() {
        let mut model = candidate.clone();
        model.model.fit(&train_x, &train_y).unwrap();

        let (test_x, _) = create_regression_data(1000, 12);
        group.bench_with_input(BenchmarkId::new("predict", &model.name), &test_x, |b, x| {
            b.iter(|| model.predict(black_box(x)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_candidates, bench_prediction);
criterion_main!(benches);
