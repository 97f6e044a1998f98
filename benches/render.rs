use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use verse_canvas::{
    config::OverlayConfig,
    overlay::{FontRegistry, TextOverlaySpec},
    pipeline::render,
    raster::{apply_blur, apply_filter, Adjustments, Image, NamedFilter},
};

fn test_image(size: u32) -> Image {
    let mut data = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8]);
        }
    }
    Image::from_raw(size, size, 3, data).expect("valid test image")
}

fn bench_blur(c: &mut Criterion) {
    let image = test_image(512);
    let mut group = c.benchmark_group("blur_512");
    for level in [1u8, 3, 5] {
        group.bench_with_input(BenchmarkId::from_parameter(level), &level, |b, &level| {
            b.iter(|| apply_blur(black_box(&image), level))
        });
    }
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let image = test_image(512);
    let mut group = c.benchmark_group("filter_512");
    for filter in [NamedFilter::Smooth, NamedFilter::SmoothMore, NamedFilter::Emboss] {
        group.bench_with_input(BenchmarkId::from_parameter(filter.name()), &filter, |b, &filter| {
            b.iter(|| apply_filter(black_box(&image), filter))
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let image = test_image(1024);
    let fonts = FontRegistry::empty();
    let settings = OverlayConfig::default();
    let adjustments = Adjustments::new(1.2, 0.9, 2).expect("valid adjustments");
    let overlay = TextOverlaySpec::disabled();

    c.bench_function("render_1024_adjust_only", |b| {
        b.iter(|| render(black_box(&image), &adjustments, &overlay, &fonts, &settings))
    });
}

criterion_group!(benches, bench_blur, bench_filters, bench_render);
criterion_main!(benches);
