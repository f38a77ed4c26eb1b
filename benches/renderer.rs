use criterion::{Criterion, criterion_group, criterion_main};
use goatmap::config::Config;
use goatmap::coverage::{annotate, buffer_point, compute_coverage};
use goatmap::layout::{ResolvedFonts, compute_layout};
use goatmap::render::render_svg;
use geo::{Point, polygon};
use std::hint::black_box;

fn bench_coverage(c: &mut Criterion) {
    let zone = buffer_point(Point::new(0.0, 0.0), 1.0, 16);
    let square = polygon![
        (x: 0.0, y: 0.0),
        (x: 2.0, y: 0.0),
        (x: 2.0, y: 2.0),
        (x: 0.0, y: 2.0),
    ];
    c.bench_function("coverage_partial_square", |b| {
        b.iter(|| compute_coverage(black_box(&square), black_box(&zone)))
    });

    let config = Config::default();
    let projected = config.scene.project(config.coverage.quad_segments);
    c.bench_function("coverage_deventer", |b| {
        b.iter(|| annotate(black_box(&projected).region_polygons(), &projected.zone))
    });
}

fn bench_render(c: &mut Criterion) {
    let config = Config::default();
    let projected = config.scene.project(config.coverage.quad_segments);
    let coverage = annotate(projected.region_polygons(), &projected.zone);
    let fonts = ResolvedFonts::generic();
    c.bench_function("layout_and_svg", |b| {
        b.iter(|| {
            let layout = compute_layout(&config, &projected, &coverage, &[], &fonts)
                .expect("layout");
            black_box(render_svg(&layout, &config.style))
        })
    });
}

criterion_group!(benches, bench_coverage, bench_render);
criterion_main!(benches);
