use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use gridsweep::{narrow::swept::aabb_sweep, Aabb, ColliderDesc, ColliderId, Fp, Pivot, SpatialGrid, Vec2, World};

fn tile_world(tiles: i32, movers: i32) -> World {
    let mut world = World::new(32.0, (tiles * 4 + movers) as usize).unwrap();
    // a floor and two walls of 16x16 tiles enclosing the movers
    for i in 0..tiles {
        for &pos in [
            Vec2::new(i as Fp * 16.0, 0.0),
            Vec2::new(0.0, (i + 1) as Fp * 16.0),
            Vec2::new((tiles - 1) as Fp * 16.0, (i + 1) as Fp * 16.0),
        ]
        .iter()
        {
            world.add_collider(
                ColliderDesc::new()
                    .position(pos)
                    .size(Vec2::new(16.0, 16.0))
                    .pivot(Pivot::BottomLeft)
                    .fixed(true),
            );
        }
    }
    for i in 0..movers {
        world.add_collider(
            ColliderDesc::new()
                .position(Vec2::new(24.0 + (i % 16) as Fp * 20.0, 40.0 + (i / 16) as Fp * 20.0))
                .velocity(Vec2::new(if i % 2 == 0 { 300.0 } else { -300.0 }, -500.0))
                .size(Vec2::new(12.0, 12.0))
                .pivot(Pivot::Bottom),
        );
    }
    world
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("aabb sweep hit", |b| b.iter(|| aabb_sweep(
        black_box(&Aabb::new(-5.0, 4.0, -3.0, 6.0)),
        black_box(&Aabb::new(0.0, 0.0, 10.0, 10.0)),
        black_box(Vec2::new(10.0, 1.0)))));

    c.bench_function("aabb sweep miss", |b| b.iter(|| aabb_sweep(
        black_box(&Aabb::new(-5.0, 4.0, -3.0, 6.0)),
        black_box(&Aabb::new(0.0, 0.0, 10.0, 10.0)),
        black_box(Vec2::new(-10.0, 1.0)))));

    let mut grid = SpatialGrid::new(16.0).unwrap();
    for i in 0..1024 {
        let (x, y) = ((i % 32) as Fp * 12.0, (i / 32) as Fp * 12.0);
        grid.insert(ColliderId(i), &Aabb::new(x, y, x + 20.0, y + 20.0), i % 3 == 0);
    }
    c.bench_function("grid query", |b| b.iter(|| grid.query(
        black_box(&Aabb::new(100.0, 100.0, 160.0, 140.0)))));

    c.bench_function("world update 64 movers", |b| b.iter_batched_ref(
        || tile_world(40, 64),
        |world| world.update(black_box(1.0 / 60.0)),
        BatchSize::SmallInput,
    ));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
