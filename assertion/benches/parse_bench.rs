use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn parse_simple_bench(c: &mut Criterion) {
    c.bench_function("parse_bare_username", |b| {
        b.iter(|| trackid_assertion::parse(black_box("alice")))
    });
}

fn parse_compound_bench(c: &mut Criterion) {
    let input = "alice+twitter:alice_h+github:alice,dns:example.com+https://example.com,uid:0123456789abcdef0123456789abcdef";

    c.bench_function("parse_compound", |b| {
        b.iter(|| trackid_assertion::parse(black_box(input)))
    });
}

fn render_bench(c: &mut Criterion) {
    let a = trackid_assertion::parse("alice+twitter:alice_h+github:alice,dns:example.com").unwrap();

    c.bench_function("render_compound", |b| b.iter(|| black_box(&a).render()));
}

criterion_group!(benches, parse_simple_bench, parse_compound_bench, render_bench);
criterion_main!(benches);
