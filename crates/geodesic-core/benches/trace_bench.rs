// -------------------------------------------------------------------------
// SCPN Geodesic Core -- Tracer Benchmark
// Measures the reinit-and-solve hot loop: single disc-hitting rays and a
// full offset root solve, on Schwarzschild and a rapidly spinning Kerr.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geodesic_core::geometry::{AccretionGeometry, ThinDisc};
use geodesic_core::inversion::find_offset_for_radius;
use geodesic_core::tracer::{impact_parameter_velocity, TracerSession};
use geodesic_metrics::{Kerr, Schwarzschild, Spacetime};
use geodesic_types::config::TracerConfig;
use geodesic_types::state::RayState;
use std::hint::black_box;

const OBSERVER: [f64; 4] = [0.0, 100.0, 1.0, 0.0];

fn run_trace<M: Spacetime<f64>>(session: &mut TracerSession<M>, metric: &M, alpha: f64) {
    let v = impact_parameter_velocity(metric, &OBSERVER, alpha, 0.0);
    let p = session.reinit_and_solve(RayState::new(OBSERVER, v));
    black_box(p.lambda);
}

fn bench_reinit_and_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracer_reinit_and_solve");
    let cfg = TracerConfig::default();
    let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));

    let schw = Schwarzschild::new(1.0);
    let mut session = TracerSession::new(&schw, Some(&geom), &cfg);
    group.bench_function(BenchmarkId::new("disc_hit", "Schwarzschild"), |b| {
        b.iter(|| run_trace(&mut session, &schw, 8.0))
    });

    let kerr = Kerr::new(1.0, 0.9);
    let mut session = TracerSession::new(&kerr, Some(&geom), &cfg);
    group.bench_function(BenchmarkId::new("disc_hit", "Kerr-0.9"), |b| {
        b.iter(|| run_trace(&mut session, &kerr, 8.0))
    });

    group.finish();
}

fn bench_offset_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("inversion_offset_solve");
    // Each iteration runs a full bracket-plus-Brent solve, tens of traces.
    group.sample_size(10);
    let cfg = TracerConfig::default();
    let geom = AccretionGeometry::Thin(ThinDisc::new(4.0, 30.0));
    let metric = Schwarzschild::new(1.0);

    group.bench_function("ring_radius_8", |b| {
        b.iter(|| {
            let (r_off, _) =
                find_offset_for_radius(&metric, OBSERVER, &geom, 8.0, 0.0, &cfg);
            black_box(r_off);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_reinit_and_solve, bench_offset_solve);
criterion_main!(benches);
