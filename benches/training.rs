use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use housing_mlp::prelude::*;

fn prepared(n_rows: usize) -> PreparedData {
    let df = SyntheticHousing::new(n_rows).generate().unwrap();
    Preprocessor::new(PreprocessingConfig::default(), 42)
        .run(&df)
        .unwrap()
        .prepared
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    group.sample_size(10);

    for n_rows in [1000, 5000, 20640].iter() {
        let df = SyntheticHousing::new(*n_rows).generate().unwrap();

        group.bench_with_input(BenchmarkId::new("run", n_rows), &df, |b, df| {
            b.iter(|| {
                Preprocessor::new(PreprocessingConfig::default(), 42)
                    .run(black_box(df))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000, 20640].iter() {
        let data = prepared(*n_rows);

        group.bench_with_input(BenchmarkId::new("epoch", n_rows), &data, |b, data| {
            let mut model = MLPRegressor::new(MLPConfig::default(), 42);
            b.iter(|| model.advance_one_epoch(black_box(&data.train.x), &data.train.y).unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let data = prepared(5000);
    let mut model = MLPRegressor::new(MLPConfig::default(), 42);
    for _ in 0..5 {
        model.advance_one_epoch(&data.train.x, &data.train.y).unwrap();
    }

    group.bench_function("predict_test", |b| {
        b.iter(|| model.predict(black_box(&data.test.x)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_preprocessing, bench_epoch, bench_prediction);
criterion_main!(benches);
