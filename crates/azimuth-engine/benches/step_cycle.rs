//! Criterion benchmarks for the PIC cycle and its deposition stage.

use std::hint::black_box;

use azimuth_core::DepositKind;
use azimuth_engine::{Simulation, StepOptions};
use azimuth_test_utils::fixtures::uniform_plasma_config;
use azimuth_test_utils::FrozenSolver;
use criterion::{criterion_group, criterion_main, Criterion};

fn quiet() -> StepOptions {
    StepOptions {
        show_progress: false,
        ..StepOptions::default()
    }
}

/// 32 x 8 cells, 2 modes, 16 electrons per cell.
fn make_simulation() -> Simulation {
    Simulation::new(uniform_plasma_config(1e24), Box::new(FrozenSolver)).unwrap()
}

fn bench_single_step(c: &mut Criterion) {
    let mut sim = make_simulation();
    let options = quiet();
    c.bench_function("step_4096_particles", |b| {
        b.iter(|| {
            let metrics = sim.step(1, &options).unwrap();
            black_box(metrics.total_us);
        });
    });
}

fn bench_ten_steps(c: &mut Criterion) {
    let mut sim = make_simulation();
    let options = quiet();
    c.bench_function("step_10_4096_particles", |b| {
        b.iter(|| {
            let metrics = sim.step(10, &options).unwrap();
            black_box(metrics.steps);
        });
    });
}

fn bench_deposit(c: &mut Criterion) {
    let mut sim = make_simulation();
    let mut group = c.benchmark_group("deposit");
    for kind in DepositKind::ALL {
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| sim.deposit(black_box(kind)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_step, bench_ten_steps, bench_deposit);
criterion_main!(benches);
