//! Benchmarks for foundation primitives.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yangforge_foundation::{Interner, OrderedMap, QName};

fn bench_ordered_map_insert(c: &mut Criterion) {
    c.bench_function("ordered_map_insert_100", |b| {
        b.iter(|| {
            let mut map = OrderedMap::new();
            for i in 0..100 {
                map = map.insert(black_box(i), i * 2);
            }
            map
        });
    });
}

fn bench_ordered_map_lookup(c: &mut Criterion) {
    let mut map = OrderedMap::new();
    for i in 0..1000 {
        map = map.insert(i, i * 2);
    }
    c.bench_function("ordered_map_lookup", |b| {
        b.iter(|| map.get(black_box(&500)));
    });
}

fn bench_qname_intern(c: &mut Criterion) {
    c.bench_function("qname_intern_repeated", |b| {
        b.iter(|| {
            let mut interner = Interner::new();
            for _ in 0..100 {
                let qname = QName::create("urn:example:bench", "node").unwrap();
                interner.intern_qname(black_box(qname));
            }
            interner
        });
    });
}

criterion_group!(
    benches,
    bench_ordered_map_insert,
    bench_ordered_map_lookup,
    bench_qname_intern
);
criterion_main!(benches);
