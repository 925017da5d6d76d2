//! Benchmarks for the hot path of every authenticated request: canonical
//! message construction, signing, and verification — plus the recovery
//! phrase codec, which only runs at registration and recovery but is worth
//! keeping honest.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use claw_protocol::auth::{canonical_message, Operation};
use claw_protocol::crypto::{payload_digest, AgentKeypair};
use claw_protocol::identity::{decode_phrase, encode_phrase};

fn bench_payload_digest(c: &mut Criterion) {
    let small = vec![0xabu8; 256];
    let large = vec![0xabu8; 64 * 1024];

    c.bench_function("payload_digest_256b", |b| {
        b.iter(|| payload_digest(black_box(&small)))
    });
    c.bench_function("payload_digest_64k", |b| {
        b.iter(|| payload_digest(black_box(&large)))
    });
}

fn bench_sign_verify(c: &mut Criterion) {
    let keypair = AgentKeypair::generate();
    let digest = payload_digest(b"a representative encrypted blob");
    let message = canonical_message(Operation::Store, &digest, "2026-08-23T12:00:00Z");
    let signature = keypair.sign(&message);

    c.bench_function("sign_canonical_message", |b| {
        b.iter(|| keypair.sign(black_box(&message)))
    });
    c.bench_function("verify_canonical_message", |b| {
        b.iter(|| {
            keypair
                .public_key()
                .verify(black_box(&message), black_box(&signature))
        })
    });
}

fn bench_recovery_codec(c: &mut Criterion) {
    let seed = [0x5au8; 32];
    let phrase = encode_phrase(&seed).unwrap();

    c.bench_function("encode_phrase_32b", |b| {
        b.iter(|| encode_phrase(black_box(&seed)).unwrap())
    });
    c.bench_function("decode_phrase_24w", |b| {
        b.iter(|| decode_phrase(black_box(&phrase)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_payload_digest,
    bench_sign_verify,
    bench_recovery_codec
);
criterion_main!(benches);
