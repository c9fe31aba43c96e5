use criterion::{black_box, criterion_group, criterion_main, Criterion};

use beast_tactics::grid::{find_path, reachable, Coord, CostGrid, RangeQuery, Terrain, TileMap};

/// 40x40 grid with a wall every fifth column, gapped every seventh row
fn maze() -> CostGrid {
    CostGrid::from_fn(40, 40, |c| {
        if c.x % 5 == 4 && c.y % 7 != 0 {
            0
        } else {
            1 + (c.x + c.y) as u32 % 3
        }
    })
}

fn bench_find_path(c: &mut Criterion) {
    let grid = maze();
    c.bench_function("find_path 40x40 corner to corner", |b| {
        b.iter(|| find_path(black_box(&grid), Coord::new(0, 0), Coord::new(39, 39)))
    });
}

fn bench_reachable(c: &mut Criterion) {
    let grid = maze();
    c.bench_function("reachable speed 8", |b| {
        b.iter(|| reachable(black_box(&grid), Coord::new(20, 20), 8.0))
    });
}

fn bench_range_query(c: &mut Criterion) {
    let map = TileMap::new(40, 40, Terrain::Grass);
    let grid = CostGrid::uniform(40, 40, 1);
    c.bench_function("range query speed 6 range 2", |b| {
        b.iter(|| RangeQuery::compute(black_box(&map), &grid, Coord::new(20, 20), 6.0, 2))
    });
}

criterion_group!(benches, bench_find_path, bench_reachable, bench_range_query);
criterion_main!(benches);
