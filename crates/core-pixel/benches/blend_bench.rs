use core_pixel::{composite, BlendMode, Color, PixelBuffer, Rgba8};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_composite(c: &mut Criterion) {
    let mut dst: PixelBuffer<Rgba8> = PixelBuffer::new(512, 512);
    dst.set_premultiplied_flag(false);
    dst.fill(Color::rgb(255, 255, 255));
    dst.premultiply();

    let mut src: PixelBuffer<Rgba8> = PixelBuffer::new(512, 512);
    src.set_premultiplied_flag(false);
    src.fill(Color::rgba(10, 120, 200, 160));
    src.premultiply();

    let modes = [
        BlendMode::SrcOver,
        BlendMode::Multiply,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::Hue,
    ];

    c.bench_function("composite_512x512", |b| {
        b.iter(|| {
            for mode in modes {
                composite(black_box(&mut dst), black_box(&src), mode, 1.0, 0, 0);
            }
        })
    });
}

criterion_group!(benches, bench_composite);
criterion_main!(benches);
