use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use aes_core::{encrypt_block, expand_key, Aes128Key};
use masked_aes::{decrypt, encrypt, sbox, MaskedBlock, MaskedRoundKeys, Masking, MaskingConfig};

fn masking(shares: usize) -> Masking<ChaCha20Rng> {
    Masking::with_config(ChaCha20Rng::from_seed([1u8; 32]), MaskingConfig { shares })
        .expect("valid share count")
}

fn bench_sbox(c: &mut Criterion) {
    let mut group = c.benchmark_group("sbox");
    for shares in [2, 3, 5] {
        let mut m = masking(shares);
        group.bench_with_input(BenchmarkId::from_parameter(shares), &shares, |b, _| {
            b.iter(|| {
                let x = m.share(0x53);
                sbox(&mut m, x)
            });
        });
    }
    group.finish();
}

fn bench_block(c: &mut Criterion) {
    let key = Aes128Key::from([0u8; 16]);
    let round_keys = expand_key(&key);
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let mut block = [0u8; 16];
    rng.fill_bytes(&mut block);

    let mut group = c.benchmark_group("block");
    group.sample_size(10);
    for shares in [2, 3, 5] {
        let mut m = masking(shares);
        group.bench_with_input(BenchmarkId::new("encrypt", shares), &shares, |b, _| {
            b.iter(|| {
                let keys = MaskedRoundKeys::share(&mut m, &round_keys);
                let pt = MaskedBlock::share(&mut m, &block);
                encrypt(&mut m, keys, pt).expect("encrypt")
            });
        });
        group.bench_with_input(BenchmarkId::new("decrypt", shares), &shares, |b, _| {
            b.iter(|| {
                let keys = MaskedRoundKeys::share(&mut m, &round_keys);
                let ct = MaskedBlock::share(&mut m, &block);
                decrypt(&mut m, keys, ct).expect("decrypt")
            });
        });
    }
    group.bench_function("aes_core_encrypt", |b| {
        b.iter(|| encrypt_block(&block, &round_keys));
    });
    group.finish();
}

criterion_group!(benches, bench_sbox, bench_block);
criterion_main!(benches);
