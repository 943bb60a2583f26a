// ABOUTME: Benchmark of NBT decoding into typed structs, dynamic Values and reused buffers.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flate2::write::GzEncoder;
use serde::Deserialize;
use serde_nbt::{decode, decode_value, from_slice, Compression};
use std::io::Write;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Player {
    name: String,
    health: i16,
    xp_total: i32,
    pos: Vec<f64>,
    inventory: Vec<Item>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: String,
    count: i8,
    damage: i16,
}

fn put_name(out: &mut Vec<u8>, tag: u8, name: &str) {
    out.push(tag);
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
}

fn put_string(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn create_player(items: u32) -> Vec<u8> {
    let mut out = Vec::new();
    put_name(&mut out, 10, "Player");

    put_name(&mut out, 8, "Name");
    put_string(&mut out, "Notch");
    put_name(&mut out, 2, "Health");
    out.extend_from_slice(&20i16.to_be_bytes());
    put_name(&mut out, 3, "XpTotal");
    out.extend_from_slice(&1_234_567i32.to_be_bytes());

    put_name(&mut out, 9, "Pos");
    out.push(6);
    out.extend_from_slice(&3u32.to_be_bytes());
    for coord in [128.5f64, 64.0, -32.25] {
        out.extend_from_slice(&coord.to_be_bytes());
    }

    put_name(&mut out, 9, "Inventory");
    out.push(10);
    out.extend_from_slice(&items.to_be_bytes());
    for i in 0..items {
        put_name(&mut out, 8, "id");
        put_string(&mut out, &format!("minecraft:item_{i}"));
        put_name(&mut out, 1, "count");
        out.push((i % 64) as u8);
        put_name(&mut out, 2, "damage");
        out.extend_from_slice(&(i as i16).to_be_bytes());
        out.push(0);
    }

    out.push(0);
    out
}

fn create_int_list(count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    put_name(&mut out, 9, "");
    out.push(3);
    out.extend_from_slice(&count.to_be_bytes());
    for i in 0..count {
        out.extend_from_slice(&(i as i32).to_be_bytes());
    }
    out
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn bench_player(c: &mut Criterion) {
    let raw = create_player(36);
    let compressed = gzip(&raw);

    let mut group = c.benchmark_group("player_36_items");
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("struct_plain", |b| {
        b.iter(|| {
            let decoded: Player = from_slice(Compression::None, black_box(&raw)).unwrap();
            decoded
        })
    });

    group.bench_function("struct_gzip", |b| {
        b.iter(|| {
            let decoded: Player = from_slice(Compression::GZip, black_box(&compressed)).unwrap();
            decoded
        })
    });

    group.bench_function("value_plain", |b| {
        b.iter(|| decode_value(Compression::None, black_box(&raw[..])).unwrap())
    });

    println!("Player sizes: raw={} bytes, gzip={} bytes", raw.len(), compressed.len());

    group.finish();
}

fn bench_int_list(c: &mut Criterion) {
    let raw = create_int_list(1000);

    let mut group = c.benchmark_group("int_list_1000");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("fresh_vec", |b| {
        b.iter(|| {
            let decoded: Vec<i32> = from_slice(Compression::None, black_box(&raw)).unwrap();
            decoded
        })
    });

    // The destination keeps its capacity across iterations
    let mut reused: Vec<i32> = Vec::new();
    group.bench_function("reused_vec", |b| {
        b.iter(|| {
            decode(Compression::None, black_box(&raw[..]), &mut reused).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_player, bench_int_list);

criterion_main!(benches);
