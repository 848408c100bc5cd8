// Transaction benchmarks for the Tessera protocol.
//
// Covers witness signing, finalize (canonical encoding + double SHA-256),
// wire parsing and full verification, with payloads of several sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tessera_protocol::crypto::Keypair;
use tessera_protocol::transaction::{sign_and_attach, verify_transaction, Transaction};
use tessera_protocol::types::{AssetGroupId, TransactionId, UserId};

fn draft(user: UserId, payload_len: usize) -> Transaction {
    let mut tx = Transaction::with_timestamp(1_700_000_000_000);
    let relation = tx.new_relation(0).unwrap();
    relation.attach_asset(
        AssetGroupId::from_name("bench"),
        user,
        vec![0x5A; payload_len],
    );
    relation
        .attach_pointer(TransactionId::from_bytes([7; 32]), None)
        .unwrap();
    tx.declare_witness(user).unwrap();
    tx
}

fn identity() -> (UserId, Keypair) {
    let keypair = Keypair::generate();
    (UserId::from_public_key(&keypair.public_key()), keypair)
}

fn bench_sign(c: &mut Criterion) {
    let (user, keypair) = identity();
    let base = draft(user, 256);

    c.bench_function("transaction/sign", |b| {
        b.iter(|| {
            let mut tx = base.clone();
            sign_and_attach(&mut tx, user, &keypair).unwrap();
        });
    });
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction/finalize");
    let (user, keypair) = identity();

    for size in [64, 1_024, 16_384] {
        let mut signed = draft(user, size);
        sign_and_attach(&mut signed, user, &keypair).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &signed, |b, signed| {
            b.iter(|| {
                let mut tx = signed.clone();
                tx.finalize(true).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_parse_and_verify(c: &mut Criterion) {
    let (user, keypair) = identity();
    let mut tx = draft(user, 1_024);
    sign_and_attach(&mut tx, user, &keypair).unwrap();
    tx.finalize(true).unwrap();
    let bytes = tx.serialize().unwrap();

    c.bench_function("transaction/parse", |b| {
        b.iter(|| Transaction::parse(&bytes).unwrap());
    });

    c.bench_function("transaction/parse_and_verify", |b| {
        b.iter(|| {
            let parsed = Transaction::parse(&bytes).unwrap();
            verify_transaction(&parsed).unwrap();
        });
    });
}

criterion_group!(benches, bench_sign, bench_finalize, bench_parse_and_verify);
criterion_main!(benches);
