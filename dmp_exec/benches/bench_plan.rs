//! # Learn and Plan Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::dmp::{DmpTraj, FnApproxKind, GetDmpPlanRequest};
use dmp_lib::{
    learn::learn_from_demo,
    plan::{generate_plan, MAX_PLAN_LENGTH_S},
};

fn plan_benchmark(c: &mut Criterion) {
    // ---- Build a smooth 3D demonstration ----

    let num_pts = 200;
    let times: Vec<f64> = (0..num_pts).map(|i| i as f64 * 0.01).collect();
    let positions: Vec<Vec<f64>> = times
        .iter()
        .map(|t| {
            let s = (std::f64::consts::PI * t / 2.0).sin();
            vec![s, 0.5 * s * s, 0.1 * t]
        })
        .collect();
    let demo = DmpTraj::from_positions(times, positions);

    let k_gains = vec![100.0; 3];
    let d_gains = vec![20.0; 3];

    c.bench_function("learn_from_demo::fourier", |b| {
        b.iter(|| learn_from_demo(&demo, &k_gains, &d_gains, 30, FnApproxKind::Fourier).unwrap())
    });

    c.bench_function("learn_from_demo::linear", |b| {
        b.iter(|| learn_from_demo(&demo, &k_gains, &d_gains, 30, FnApproxKind::Linear).unwrap())
    });

    let learned = learn_from_demo(&demo, &k_gains, &d_gains, 30, FnApproxKind::Fourier).unwrap();
    let goal = demo.last_point().unwrap().positions.clone();

    let mut req = GetDmpPlanRequest {
        x_0: vec![0.0; 3],
        x_dot_0: vec![0.0; 3],
        t_0: 0.0,
        goal,
        goal_thresh: vec![0.01; 3],
        seg_length: -1.0,
        tau: learned.tau,
        dt: 0.01,
        integrate_iter: 5,
        obstacle: Vec::new(),
        beta: Vec::new(),
        gamma: Vec::new(),
        k: Vec::new(),
        scale_m: 0.0,
        scale_n: 1.0,
        approx: None,
        dmp_list: None,
    };

    c.bench_function("generate_plan::free", |b| {
        b.iter(|| generate_plan(&learned.dmp_list, &req, MAX_PLAN_LENGTH_S).unwrap())
    });

    // Point obstacle partway along the demonstration
    req.obstacle = vec![0.7, 0.25, 0.1];
    req.gamma = vec![1000.0];
    req.beta = vec![6.0];

    c.bench_function("generate_plan::point_obstacle", |b| {
        b.iter(|| generate_plan(&learned.dmp_list, &req, MAX_PLAN_LENGTH_S).unwrap())
    });
}

criterion_group!(benches, plan_benchmark);
criterion_main!(benches);
