//! Validation Benchmarks
//!
//! Cost of the hot validation paths: capability table construction, sample-count queries,
//! rejected and accepted storage allocations, and framebuffer completeness checks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use texgate_core::{
    AttachmentPoint, CapabilityTable, Context, ContextConfig, InternalFormat, Limits,
    TextureTarget,
};

const MS: TextureTarget = TextureTarget::Texture2DMultisample;
const MS_ARRAY: TextureTarget = TextureTarget::Texture2DMultisampleArray;

fn bench_capability_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("capability_table");

    for (name, limits) in [("d3d11", Limits::d3d11()), ("desktop_gl", Limits::desktop_gl())] {
        group.bench_with_input(BenchmarkId::new("build", name), &limits, |b, limits| {
            b.iter(|| black_box(CapabilityTable::from_limits(limits, &[])));
        });
    }

    let table = CapabilityTable::from_limits(&Limits::d3d11(), &[]);
    group.bench_function("query_all", |b| {
        b.iter(|| {
            let mut total = 0u32;
            for target in CapabilityTable::TARGETS {
                for format in InternalFormat::ALL {
                    total += table.max_samples(target, format).unwrap_or(0);
                }
            }
            black_box(total)
        });
    });

    group.finish();
}

fn bench_storage_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tex_storage");

    group.bench_function("rejected_by_gate", |b| {
        let mut ctx = Context::new(ContextConfig::es31_webgl()).unwrap();
        b.iter(|| {
            let result =
                ctx.tex_storage_3d_multisample(MS_ARRAY, 4, InternalFormat::Rgba8, 64, 64, 4, true);
            black_box(result.is_err());
            ctx.take_error()
        });
    });

    group.bench_function("rejected_immutable", |b| {
        let mut ctx = Context::new(ContextConfig::es31_d3d11()).unwrap();
        let tex = ctx.gen_textures(1)[0];
        ctx.bind_texture(MS, Some(tex)).unwrap();
        ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 64, 64, true)
            .unwrap();
        b.iter(|| {
            let result =
                ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 64, 64, true);
            black_box(result.is_err());
            ctx.take_error()
        });
    });

    for count in [10usize, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("allocate", count), count, |b, &count| {
            b.iter_batched(
                || {
                    let mut ctx = Context::new(ContextConfig::es31_d3d11()).unwrap();
                    let ids = ctx.gen_textures(count);
                    (ctx, ids)
                },
                |(mut ctx, ids)| {
                    for id in ids {
                        ctx.bind_texture(MS, Some(id)).unwrap();
                        ctx.tex_storage_2d_multisample(MS, 4, InternalFormat::Rgba8, 16, 16, true)
                            .unwrap();
                    }
                    ctx
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_framebuffer_completeness(c: &mut Criterion) {
    let mut group = c.benchmark_group("framebuffer_completeness");

    let mut ctx = Context::new(ContextConfig::es31_d3d11()).unwrap();
    let fb = ctx.gen_framebuffers(1)[0];
    let formats = [
        (AttachmentPoint::Color(0), InternalFormat::Rgba8),
        (AttachmentPoint::Color(1), InternalFormat::Rgba8UI),
        (AttachmentPoint::DepthStencil, InternalFormat::Depth24Stencil8),
    ];
    for (point, format) in formats {
        let tex = ctx.gen_textures(1)[0];
        ctx.bind_texture(MS_ARRAY, Some(tex)).unwrap();
        ctx.tex_storage_3d_multisample(MS_ARRAY, 4, format, 32, 32, 4, true)
            .unwrap();
        ctx.framebuffer_texture_layer(fb, point, Some(tex), 0, 3)
            .unwrap();
    }

    group.bench_function("three_attachments", |b| {
        b.iter(|| black_box(ctx.check_framebuffer_status(fb)));
    });

    group.bench_function("sample_positions", |b| {
        ctx.bind_draw_framebuffer(Some(fb)).unwrap();
        b.iter(|| {
            for index in 0..4 {
                black_box(ctx.query_sample_position(index).ok());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_capability_table,
    bench_storage_validation,
    bench_framebuffer_completeness,
);

criterion_main!(benches);
