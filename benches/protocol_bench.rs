//! Benchmarks for the protocol module.
//!
//! Run with: `cargo bench --bench protocol_bench`

use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mysqlx_wire::protocol::framing::{encode_frame, read_frame};
use mysqlx_wire::protocol::messages::{decode_capabilities, decode_error};
use mysqlx_wire::protocol::notice::{NoticeBody, NoticeEnvelope};
use mysqlx_wire::protocol::pb;
use mysqlx_wire::DEFAULT_MAX_FRAME_SIZE;

/// Generate a realistic error payload
fn make_error_payload() -> BytesMut {
    let mut buf = BytesMut::new();
    pb::put_varint_field(&mut buf, 1, 0);
    pb::put_varint_field(&mut buf, 2, 1146);
    pb::put_str_field(&mut buf, 3, "Table 'test.users' doesn't exist");
    pb::put_str_field(&mut buf, 4, "42S02");
    buf
}

/// Generate a warning notice frame payload
fn make_warning_notice_payload() -> BytesMut {
    let mut inner = BytesMut::new();
    pb::put_varint_field(&mut inner, 2, 1287);
    pb::put_str_field(&mut inner, 3, "'@@tx_isolation' is deprecated");
    let mut frame = BytesMut::new();
    pb::put_varint_field(&mut frame, 1, 1);
    pb::put_varint_field(&mut frame, 2, 2);
    pb::put_bytes_field(&mut frame, 3, &inner);
    frame
}

/// Generate a capabilities payload with `n` string entries
fn make_capabilities_payload(n: usize) -> BytesMut {
    let mut body = BytesMut::new();
    for i in 0..n {
        let mut string = BytesMut::new();
        pb::put_str_field(&mut string, 1, "JSON");
        let mut scalar = BytesMut::new();
        pb::put_varint_field(&mut scalar, 1, 8);
        pb::put_bytes_field(&mut scalar, 9, &string);
        let mut any = BytesMut::new();
        pb::put_varint_field(&mut any, 1, 1);
        pb::put_bytes_field(&mut any, 2, &scalar);

        let name = format!("capability.{i}");
        let mut cap = BytesMut::new();
        pb::put_str_field(&mut cap, 1, &name);
        pb::put_bytes_field(&mut cap, 2, &any);
        pb::put_bytes_field(&mut body, 1, &cap);
    }
    body
}

fn bench_frame_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_roundtrip");

    for size in [0usize, 64, 1024, 16384] {
        let payload = vec![0x42u8; size];
        group.throughput(Throughput::Bytes((size + 5) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| {
                let buf =
                    encode_frame(black_box(12), black_box(payload), DEFAULT_MAX_FRAME_SIZE)
                        .unwrap();
                read_frame(&mut buf.as_ref(), DEFAULT_MAX_FRAME_SIZE).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_decode_error(c: &mut Criterion) {
    let payload = make_error_payload();
    c.bench_function("decode_error", |b| {
        b.iter(|| decode_error(black_box(&payload)).unwrap());
    });
}

fn bench_decode_notice(c: &mut Criterion) {
    let payload = make_warning_notice_payload();
    c.bench_function("decode_notice", |b| {
        b.iter(|| {
            let env = NoticeEnvelope::decode(black_box(&payload)).unwrap();
            NoticeBody::decode(env.notice_type, &env.payload).unwrap()
        });
    });
}

fn bench_decode_capabilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_capabilities");

    for n in [1usize, 8, 32] {
        let payload = make_capabilities_payload(n);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &payload, |b, payload| {
            b.iter(|| decode_capabilities(black_box(payload)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_frame_roundtrip,
    bench_decode_error,
    bench_decode_notice,
    bench_decode_capabilities
);
criterion_main!(benches);
