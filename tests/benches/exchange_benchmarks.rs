//! # CoSim-Link Benchmarks
//!
//! | Area | Operation | Scales with |
//! |------|-----------|-------------|
//! | cosim-types | `Info` set / get, `ModelPart` construction | entries, nodes |
//! | cosim-bus | frame encode / decode | payload size |
//! | cosim-io | in-memory data rendezvous | vector length |

use cosim_bus::{decode, encode, Frame, InMemoryHub, Payload};
use cosim_io::{CoSimApi, CoSimIo, ElementType, Info, ModelPart, RuntimeConfig, Vector};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;

// ============================================================================
// cosim-types
// ============================================================================

fn bench_info_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosim-types-info");

    for size in [10usize, 100, 1000] {
        let keys: Vec<String> = (0..size).map(|i| format!("key_{i}")).collect();
        let mut info = Info::new();
        for (i, key) in keys.iter().enumerate() {
            info.set_int(key.as_str(), i as i64);
        }

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("get_int", size), &keys, |b, keys| {
            b.iter(|| {
                for key in keys {
                    black_box(info.get_int(key).ok());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("clone", size), &info, |b, info| {
            b.iter(|| black_box(info.clone()))
        });
    }
    group.finish();
}

fn build_strip(nodes: usize) -> ModelPart {
    let mut model_part = ModelPart::new("strip").unwrap();
    for id in 1..=nodes as i64 {
        model_part
            .create_new_node(id, id as f64, (id % 2) as f64, 0.0)
            .unwrap();
    }
    for id in 1..nodes as i64 - 1 {
        model_part
            .create_new_element(id, ElementType::Triangle3D3, &[id, id + 1, id + 2])
            .unwrap();
    }
    model_part
}

fn bench_model_part_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosim-types-model-part");

    for nodes in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::new("build_strip", nodes), &nodes, |b, &n| {
            b.iter(|| black_box(build_strip(n)))
        });
    }
    group.finish();
}

// ============================================================================
// cosim-bus
// ============================================================================

fn bench_frame_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosim-bus-frame");
    let mut rng = rand::thread_rng();

    for len in [1_000usize, 100_000, 1_000_000] {
        let values: Vec<f64> = (0..len).map(|_| rng.gen()).collect();
        let frame = Frame::new("field", Payload::Data(values));
        let bytes = encode(&frame).unwrap();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode_data", len), &frame, |b, frame| {
            b.iter(|| black_box(encode(frame).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("decode_data", len), &bytes, |b, bytes| {
            b.iter(|| black_box(decode(bytes).unwrap()))
        });
    }
    group.finish();
}

// ============================================================================
// cosim-io
// ============================================================================

fn bench_data_rendezvous(c: &mut Criterion) {
    let mut group = c.benchmark_group("cosim-io-rendezvous");
    group.measurement_time(Duration::from_secs(10));

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let hub = InMemoryHub::new();
    let a = CoSimIo::with_hub(RuntimeConfig::default(), hub.clone());
    let b = CoSimIo::with_hub(RuntimeConfig::default(), hub);

    runtime.block_on(async {
        let (ra, rb) = tokio::join!(
            a.connect(&Info::new().with("my_name", "a").with("connect_to", "b")),
            b.connect(&Info::new().with("my_name", "b").with("connect_to", "a")),
        );
        ra.unwrap();
        rb.unwrap();
    });

    let settings = Info::new()
        .with("connection_name", "a_b")
        .with("identifier", "field");

    for len in [1_000usize, 100_000] {
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("export_import_data", len), &values, |bench, values| {
            let mut received = Vector::new();
            bench.iter(|| {
                runtime.block_on(async {
                    let (exported, imported) = tokio::join!(
                        a.export_data(&settings, values),
                        b.import_data(&settings, &mut received),
                    );
                    exported.unwrap();
                    black_box(imported.unwrap());
                })
            })
        });
    }
    group.finish();

    runtime.block_on(async {
        let close = Info::new().with("connection_name", "a_b");
        let (ra, rb) = tokio::join!(a.disconnect(&close), b.disconnect(&close));
        ra.unwrap();
        rb.unwrap();
    });
}

criterion_group!(
    benches,
    bench_info_access,
    bench_model_part_construction,
    bench_frame_codec,
    bench_data_rendezvous,
);
criterion_main!(benches);
