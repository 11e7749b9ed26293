//! Benchmarks for the Newton solver.
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use faer::Mat;
use global_newton::{Config, solve, solve_with_jacobian};

// Intersection of the unit circle with the line x = y.
fn circle_line_residual(_params: &[f64], x: &[f64], out: &mut [f64]) {
    out[0] = x[0] * x[0] + x[1] * x[1] - 1.0;
    out[1] = x[0] - x[1];
}

fn circle_line_jacobian(_params: &[f64], x: &[f64], out: &mut Mat<f64>) {
    out[(0, 0)] = 2.0 * x[0];
    out[(0, 1)] = 2.0 * x[1];
    out[(1, 0)] = 1.0;
    out[(1, 1)] = -1.0;
}

fn bench_fd(c: &mut Criterion) {
    c.bench_function("circle_line_fd", |b| {
        b.iter(|| {
            let mut x = black_box([0.5, 0.5]);
            solve(&circle_line_residual, &[], &mut x, Config::default()).unwrap()
        });
    });
}

fn bench_analytic(c: &mut Criterion) {
    c.bench_function("circle_line_analytic", |b| {
        b.iter(|| {
            let mut x = black_box([0.5, 0.5]);
            solve_with_jacobian(
                &circle_line_residual,
                &circle_line_jacobian,
                &[],
                &mut x,
                Config::default(),
            )
            .unwrap()
        });
    });
}

fn bench_line_search(c: &mut Criterion) {
    c.bench_function("circle_line_step_control", |b| {
        let config = Config::default().with_step_length_control(true);
        b.iter(|| {
            let mut x = black_box([0.5, 0.5]);
            solve_with_jacobian(
                &circle_line_residual,
                &circle_line_jacobian,
                &[],
                &mut x,
                config,
            )
            .unwrap()
        });
    });
}

criterion_group!(benches, bench_fd, bench_analytic, bench_line_search);
criterion_main!(benches);
