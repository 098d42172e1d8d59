use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eph::spline::Spline;

/// Electronic energy E(T) = γT²/2 tabulated every 10 K
fn energy_table(n: usize) -> Spline {
    let gamma = 1e-4;
    let dt = 10.0;
    let energy: Vec<f64> = (0..n)
        .map(|i| 0.5 * gamma * (i as f64 * dt).powi(2))
        .collect();
    Spline::new(dt, &energy)
}

/// Single-call benchmarks
fn bench_spline_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("single");
    let spline = energy_table(2000);

    group.bench_function("evaluate", |b| {
        b.iter(|| spline.evaluate(black_box(1234.5)))
    });

    group.bench_function("derivative", |b| {
        b.iter(|| spline.derivative(black_box(1234.5)))
    });

    let energy = spline.evaluate(1234.5);
    group.bench_function("reverse", |b| b.iter(|| spline.reverse(black_box(energy))));

    group.bench_function("build_2000", |b| b.iter(|| energy_table(black_box(2000))));

    group.finish();
}

/// Batch benchmarks over many temperatures
fn bench_spline_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let spline = energy_table(2000);
    let n = 10000;
    let (_, t_max) = spline.domain();
    let temperatures: Vec<f64> = (0..n).map(|i| t_max * i as f64 / n as f64).collect();
    let energies: Vec<f64> = temperatures.iter().map(|&t| spline.evaluate(t)).collect();

    group.bench_with_input(
        BenchmarkId::new("evaluate", n),
        &temperatures,
        |b, temperatures| {
            b.iter(|| {
                temperatures
                    .iter()
                    .map(|&t| spline.evaluate(t))
                    .sum::<f64>()
            })
        },
    );

    group.bench_with_input(BenchmarkId::new("reverse", n), &energies, |b, energies| {
        b.iter(|| energies.iter().map(|&e| spline.reverse(e)).sum::<f64>())
    });

    group.finish();
}

criterion_group!(benches, bench_spline_single, bench_spline_batch);
criterion_main!(benches);
