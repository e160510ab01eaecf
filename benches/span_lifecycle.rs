use criterion::{black_box, criterion_group, criterion_main, Criterion};
use microtrace::start_root;

fn bench_root_and_child(c: &mut Criterion) {
    c.bench_function("root_span_open_finish", |b| {
        b.iter(|| {
            let (ctx, root) = start_root(black_box(1), "op").unwrap();
            root.finish();
            black_box(microtrace::collect(&ctx));
        })
    });
}

fn bench_deep_chain(c: &mut Criterion) {
    c.bench_function("1000_sequential_spans", |b| {
        b.iter(|| {
            let (ctx, root) = start_root(black_box(1), "root").unwrap();
            let mut carrier = ctx.clone();
            for _ in 0..1000 {
                let span = carrier.start_child("step");
                carrier = span.context();
                span.finish();
            }
            root.finish();
            black_box(microtrace::collect(&ctx));
        })
    });
}

fn bench_property_attach(c: &mut Criterion) {
    c.bench_function("span_with_ten_properties", |b| {
        b.iter(|| {
            let (ctx, mut root) = start_root(black_box(1), "op").unwrap();
            for i in 0..10 {
                root.add_property(format!("key{i}"), "value");
            }
            root.finish();
            black_box(microtrace::collect(&ctx));
        })
    });
}

criterion_group!(benches, bench_root_and_child, bench_deep_chain, bench_property_attach);
criterion_main!(benches);
