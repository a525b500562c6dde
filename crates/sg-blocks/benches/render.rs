//! Criterion benchmarks for the block renderer.
//!
//! Run with: `cargo bench -p sg-blocks`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use sg_blocks::quantize::{Sample, quantize};
use sg_blocks::render::render_with;
use sg_core::bitmap::Bitmap;
use sg_core::color::Color;
use sg_core::config::{BlendSpace, RenderConfig};

/// Diagonal RGB gradient with a transparent stripe, so every block has a split.
fn gradient(width: u32, height: u32) -> Bitmap {
    Bitmap::from_fn(width, height, |x, y| {
        let alpha = if (x / 16) % 5 == 0 { 0 } else { 255 };
        [(x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8, alpha]
    })
}

fn bench_quantize(c: &mut Criterion) {
    let block: [Sample; 8] = std::array::from_fn(|i| Sample {
        color: Color::rgb((i * 31) as u8, (255 - i * 17) as u8, 90),
        index: i as u8,
    });
    let mut group = c.benchmark_group("quantize");
    for blend in [BlendSpace::Linear, BlendSpace::Lab] {
        group.bench_function(format!("{blend:?}"), |b| {
            b.iter(|| quantize(black_box(block), blend));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for (w, h) in [(160, 96), (640, 384)] {
        let bmp = gradient(w, h);
        group.throughput(Throughput::Elements(u64::from(w / 2 * (h / 4))));
        for parallel in [false, true] {
            let config = RenderConfig {
                parallel,
                ..RenderConfig::default()
            };
            let id = BenchmarkId::new(if parallel { "parallel" } else { "sequential" }, format!("{w}x{h}"));
            group.bench_with_input(id, &bmp, |b, bmp| {
                b.iter(|| render_with(black_box(bmp), &config));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_quantize, bench_render);
criterion_main!(benches);
