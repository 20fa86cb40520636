use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use planets::{
    Body,
    presets::star_with_satellites,
    sim::{
        CollisionModel, PhysicsParams,
        gravity::{compute_accelerations_parallel, compute_accelerations_single_threaded},
        resolve_collisions, step,
    },
};

fn gen_cluster(count: usize) -> Vec<Body> {
    (0..count)
        .map(|_| {
            Body::new(rand::random_range(1.0..5.0), 0.0)
                .with_position(rand::random_range(0.0..800.0), rand::random_range(0.0..600.0))
                .with_velocity(rand::random_range(-10.0..10.0), rand::random_range(-10.0..10.0))
        })
        .collect()
}

fn bench_gravity(c: &mut Criterion) {
    let bodies = gen_cluster(1000);

    c.bench_function("gravity_1k", |b| {
        b.iter(|| compute_accelerations_single_threaded(&bodies, 100.0))
    });
    c.bench_function("gravity_1k_par", |b| {
        b.iter(|| compute_accelerations_parallel(&bodies, 100.0))
    });
}

fn bench_collisions(c: &mut Criterion) {
    let bodies = gen_cluster(1000);

    c.bench_function("collisions_1k", |b| {
        b.iter_batched_ref(
            || bodies.clone(),
            |bodies| resolve_collisions(bodies, CollisionModel::INELASTIC),
            BatchSize::SmallInput,
        )
    });
}

fn bench_step(c: &mut Criterion) {
    let bodies = star_with_satellites(500, 0);

    c.bench_function("step_star_500", |b| {
        b.iter_batched_ref(
            || bodies.clone(),
            |bodies| step(bodies, PhysicsParams::default()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_gravity, bench_collisions, bench_step);
criterion_main!(benches);
