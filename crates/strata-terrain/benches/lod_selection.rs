use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::Vec3;
use strata_terrain::{QuadTree, generate_grid};

fn bench_build_quadtree(c: &mut Criterion) {
    c.bench_function("quadtree_build_4096", |bencher| {
        bencher.iter(|| black_box(QuadTree::new(black_box(4096.0))))
    });
}

fn bench_select_center(c: &mut Criterion) {
    let tree = QuadTree::new(4096.0);
    let index_count = generate_grid().index_count();
    let camera = Vec3::new(2048.0, 50.0, 2048.0);
    c.bench_function("quadtree_select_center", |bencher| {
        bencher.iter(|| black_box(tree.select(black_box(camera), index_count)))
    });
}

fn bench_select_far(c: &mut Criterion) {
    let tree = QuadTree::new(4096.0);
    let index_count = generate_grid().index_count();
    let camera = Vec3::new(-100_000.0, 50.0, -100_000.0);
    c.bench_function("quadtree_select_far", |bencher| {
        bencher.iter(|| black_box(tree.select(black_box(camera), index_count)))
    });
}

fn bench_generate_grid(c: &mut Criterion) {
    c.bench_function("generate_grid", |bencher| {
        bencher.iter(|| black_box(generate_grid()))
    });
}

criterion_group!(
    benches,
    bench_build_quadtree,
    bench_select_center,
    bench_select_far,
    bench_generate_grid
);
criterion_main!(benches);
