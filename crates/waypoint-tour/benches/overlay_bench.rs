//! Benchmarks for overlay placement and target re-measurement.
//!
//! Placement runs on every resize and scroll event, so it should stay far
//! below a frame budget even when it has to flip and clamp.
//!
//! Run with: cargo bench -p waypoint-tour --bench overlay_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use waypoint_core::geometry::{Rect, Size};
use waypoint_tour::{
    OverlayLayout, Phase, ScreenModel, Step, StepCatalog, TooltipSide, TourConfig,
    TourController, place,
};
use web_time::Duration;

const VIEWPORT: Size = Size::new(1280, 800);

// ============================================================================
// Placement
// ============================================================================

fn bench_place(c: &mut Criterion) {
    let layout = OverlayLayout::default();
    let cases = [
        ("fits", Some(Rect::new(500, 100, 200, 40)), TooltipSide::Bottom),
        ("flips", Some(Rect::new(500, 700, 200, 40)), TooltipSide::Bottom),
        ("clamps", Some(Rect::new(0, 0, 60, 800)), TooltipSide::Left),
        ("fallback", None, TooltipSide::Top),
    ];

    let mut group = c.benchmark_group("overlay/place");
    for (name, target, side) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &target, |b, target| {
            b.iter(|| place(black_box(*target), black_box(side), black_box(VIEWPORT), &layout));
        });
    }
    group.finish();
}

// ============================================================================
// Resize path
// ============================================================================

fn resize_fixture(elements: usize) -> TourController<ScreenModel> {
    let catalog = StepCatalog::new(
        vec![Phase::new(1, "Only", "")],
        vec![Step::new("s", 1, "page", "target")],
        [],
    )
    .expect("catalog");
    let mut screen = ScreenModel::new();
    for i in 0..elements {
        // Hidden duplicates ahead of the visible one.
        screen.mark("target", Rect::new(0, 0, 0, 0));
        screen.mark(format!("other-{i}"), Rect::new(10, 10, 10, 10));
    }
    screen.mark("target", Rect::new(300, 200, 120, 40));
    let mut tour = TourController::new(catalog, TourConfig::default(), screen, VIEWPORT);
    tour.start();
    tour.tick(Duration::from_millis(2000));
    tour
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay/resize");
    for elements in [1usize, 16, 256] {
        let mut tour = resize_fixture(elements);
        let mut flip = false;
        group.bench_with_input(BenchmarkId::from_parameter(elements), &elements, |b, _| {
            b.iter(|| {
                flip = !flip;
                let size = if flip { Size::new(1024, 768) } else { VIEWPORT };
                tour.on_viewport_change(black_box(size));
                black_box(tour.placement())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_place, bench_resize);
criterion_main!(benches);
