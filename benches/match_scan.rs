use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_swap::core::rng::DeterministicRng;
use tile_swap::game::grid::{CollapsePlan, Grid};
use tile_swap::game::tick::GameLogic;
use tile_swap::GameConfig;

fn bench_matches_8x8(c: &mut Criterion) {
    let grid = Grid::random(8, 8, &mut DeterministicRng::new(12345));

    c.bench_function("matches_of_3_8x8", |b| {
        b.iter(|| grid.matches_of_n(black_box(3)))
    });
}

fn bench_matches_32x32(c: &mut Criterion) {
    let grid = Grid::random(32, 32, &mut DeterministicRng::new(12345));

    c.bench_function("matches_of_3_32x32", |b| {
        b.iter(|| grid.matches_of_n(black_box(3)))
    });
}

fn bench_no_match_board(c: &mut Criterion) {
    let mut rng = DeterministicRng::new(12345);

    c.bench_function("random_without_matches_8x8", |b| {
        b.iter(|| Grid::random_without_matches(8, 8, black_box(3), &mut rng))
    });
}

fn bench_collapse_plan(c: &mut Criterion) {
    let grid = Grid::parse("RGBYPRGB GBYPRGBY ........ BYPRGBYP YPRGBYPR PRGBYPRG ..RGB... RGBYPRGB")
        .unwrap_or_else(|err| panic!("bad layout: {}", err));

    c.bench_function("collapse_plan_8x8", |b| {
        b.iter(|| CollapsePlan::from_grid(black_box(&grid)))
    });
}

fn bench_update_16ms(c: &mut Criterion) {
    let mut logic = GameLogic::new(GameConfig::with_seed(12345)).unwrap_or_else(|err| panic!("{}", err));

    c.bench_function("update_16ms", |b| {
        b.iter(|| {
            logic.update(black_box(16));
        })
    });
}

criterion_group!(
    benches,
    bench_matches_8x8,
    bench_matches_32x32,
    bench_no_match_board,
    bench_collapse_plan,
    bench_update_16ms,
);

criterion_main!(benches);
