#![cfg(feature = "parallel")]

use criterion::{Criterion, criterion_group, criterion_main};
use sm_seal::symmetric::traits::{SymmetricCryptographicSystem, SymmetricParallelSystem};
use sm_seal::{CryptoConfig, Encoding, MaskingEngine, Sm4Cbc, Sm4Iv, Sm4Mode};
use std::hint::black_box;

const KEY: &str = "mykey12345678901";
const IV: &str = "1234567890abcdef";
const ROWS: usize = 10_000;

fn phone_column() -> Vec<String> {
    (0..ROWS).map(|i| format!("138{:08}", i)).collect()
}

fn bench_column_encrypt(c: &mut Criterion) {
    let engine = MaskingEngine::default();
    let column = phone_column();
    c.bench_function("MaskingEngine sm4_encrypt_column CBC 10k rows", |b| {
        b.iter(|| {
            engine
                .sm4_encrypt_column(KEY, black_box(&column), Sm4Mode::Cbc, Some(IV), Encoding::Base64)
                .unwrap()
        });
    });
    c.bench_function("MaskingEngine sm4_encrypt sequential CBC 10k rows", |b| {
        b.iter(|| {
            column
                .iter()
                .map(|v| {
                    engine
                        .sm4_encrypt(KEY, black_box(v), Sm4Mode::Cbc, Some(IV), Encoding::Base64)
                        .unwrap()
                })
                .collect::<Vec<_>>()
        });
    });
}

fn bench_column_decrypt(c: &mut Criterion) {
    let engine = MaskingEngine::default();
    let encrypted = engine
        .sm4_encrypt_column(KEY, &phone_column(), Sm4Mode::Cbc, Some(IV), Encoding::Base64)
        .unwrap();
    c.bench_function("MaskingEngine sm4_decrypt_column CBC 10k rows", |b| {
        b.iter(|| {
            engine
                .sm4_decrypt_column(KEY, black_box(&encrypted), Sm4Mode::Cbc, Some(IV), Encoding::Base64)
                .unwrap()
        });
    });
}

fn bench_batch_bytes(c: &mut Criterion) {
    let key = Sm4Cbc::generate_key(&CryptoConfig::default()).unwrap();
    let iv = Sm4Iv::from_bytes(IV.as_bytes()).unwrap();
    let rows: Vec<Vec<u8>> = (0..ROWS).map(|_| vec![0u8; 64]).collect();
    c.bench_function("Sm4Cbc par_encrypt_batch 10k x 64B", |b| {
        b.iter(|| Sm4Cbc::par_encrypt_batch(black_box(&key), Some(&iv), black_box(&rows)).unwrap());
    });
}

criterion_group!(benches, bench_column_encrypt, bench_column_decrypt, bench_batch_bytes);
criterion_main!(benches);
