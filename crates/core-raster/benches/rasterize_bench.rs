use core_geom::vertex::{Command, VecStream};
use core_raster::{FillRule, Gamma, Rasterizer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn spiky_polygon(n: usize) -> Vec<Command> {
    let mut out = Vec::with_capacity(n + 2);
    out.push(Command::MoveTo { x: 256.0, y: 0.0 });
    for i in 1..n {
        let t = (i as f64 / n as f64) * std::f64::consts::TAU;
        let r = 200.0 + 40.0 * (t * 7.0).sin();
        out.push(Command::LineTo {
            x: 256.0 + r * t.cos(),
            y: 256.0 + r * t.sin(),
        });
    }
    out.push(Command::Close);
    out.push(Command::End);
    out
}

fn bench_rasterize(c: &mut Criterion) {
    let path = spiky_polygon(2000);
    c.bench_function("rasterize_spiky_2000pt", |b| {
        b.iter(|| {
            let mut stream = VecStream::new(black_box(path.clone()));
            let mut r = Rasterizer::new();
            r.add_stream(&mut stream);
            black_box(r.sweep(FillRule::NonZero, Gamma::default(), None))
        })
    });
}

criterion_group!(benches, bench_rasterize);
criterion_main!(benches);
