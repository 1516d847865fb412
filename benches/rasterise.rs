use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageBuffer, Rgba};

use cellchat::render::halfblock::rasterise;
use cellchat::render::ColorDepth;

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
            255,
        ])
    }))
}

fn bench_rasterise_depths(c: &mut Criterion) {
    let image = gradient(640, 480);

    for depth in [
        ColorDepth::TrueColor,
        ColorDepth::Ansi256,
        ColorDepth::Ansi16,
        ColorDepth::Mono,
    ] {
        c.bench_function(&format!("rasterise_640x480_w80_{}", depth.name()), |b| {
            b.iter(|| rasterise(&image, 80, depth))
        });
    }
}

fn bench_rasterise_unscaled(c: &mut Criterion) {
    let image = gradient(60, 40);

    c.bench_function("rasterise_60x40_w80_unscaled", |b| {
        b.iter(|| rasterise(&image, 80, ColorDepth::Ansi256))
    });
}

criterion_group!(benches, bench_rasterise_depths, bench_rasterise_unscaled);
criterion_main!(benches);
