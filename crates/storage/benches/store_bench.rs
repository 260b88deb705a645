//! Benchmarks for sos-storage using criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sos_core::schema::{Schema, SchemaBuilder};
use sos_core::{DataType, Key, Value};
use sos_storage::{CmpOp, ObjectStore};

fn schema() -> Schema {
    SchemaBuilder::new("sample")
        .unwrap()
        .add_attribute("ts", DataType::UInt64, true)
        .unwrap()
        .add_attribute("node", DataType::UInt32, true)
        .unwrap()
        .build()
        .unwrap()
}

fn populated(size: u64) -> ObjectStore {
    let mut store = ObjectStore::new(schema());
    for i in 0..size {
        store
            .insert(vec![Value::UInt64(i * 7 % size), Value::UInt32((i % 64) as u32)])
            .unwrap();
    }
    store
}

fn store_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    for size in [100u64, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(populated(size)));
        });
    }

    group.finish();
}

fn store_set_benchmark(c: &mut Criterion) {
    let mut store = populated(10_000);
    let handles: Vec<_> = store.iter().map(|o| o.handle()).collect();

    c.bench_function("store_set_indexed", |b| {
        let mut n = 0u64;
        b.iter(|| {
            let h = handles[(n as usize) % handles.len()];
            store.set(h, "ts", Value::UInt64(n)).unwrap();
            n += 1;
        });
    });
}

fn store_range_benchmark(c: &mut Criterion) {
    let store = populated(10_000);
    let lo = Key::Simple(Value::UInt64(2_000));
    let hi = Key::Simple(Value::UInt64(3_000));

    c.bench_function("store_range_1000", |b| {
        b.iter(|| black_box(store.range("ts", &lo, &hi).unwrap().count()));
    });
}

fn store_filter_benchmark(c: &mut Criterion) {
    let store = populated(10_000);

    c.bench_function("store_filter_conditions", |b| {
        b.iter(|| {
            let filter = store
                .filter_on("ts")
                .unwrap()
                .condition("ts", CmpOp::Ge, Value::UInt64(5_000))
                .unwrap()
                .condition("node", CmpOp::Eq, Value::UInt32(7))
                .unwrap();
            black_box(filter.count())
        });
    });
}

criterion_group!(
    benches,
    store_insert_benchmark,
    store_set_benchmark,
    store_range_benchmark,
    store_filter_benchmark
);
criterion_main!(benches);
