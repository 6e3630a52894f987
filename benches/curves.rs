use ssh_primitives::ec::edwards::Ed25519KeyPair;
use ssh_primitives::ec::montgomery::MontgomeryCurve;
use ssh_primitives::ec::weierstrass::{EcdsaKeyPair, EllipticCurve};
use ssh_primitives::rng::Csprng;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

pub fn bench_montgomery(c: &mut Criterion) {
    for curve in [MontgomeryCurve::X25519, MontgomeryCurve::X448] {
        let private = vec![0x42u8; curve.key_len()];
        let peer = curve.public_key(&vec![0x24u8; curve.key_len()]).unwrap();
        c.bench_function(&format!("{} agree", curve.name()), |b| {
            b.iter(|| curve.agree(black_box(&private), black_box(&peer)).unwrap())
        });
    }
}

pub fn bench_ed25519(c: &mut Criterion) {
    let pair = Ed25519KeyPair::from_seed(&[7u8; 32]);
    let message = [0u8; 64];
    let signature = pair.sign(&message);

    c.bench_function("ed25519 sign", |b| b.iter(|| pair.sign(black_box(&message))));
    c.bench_function("ed25519 verify", |b| {
        b.iter(|| pair.verify(black_box(&signature), black_box(&message)))
    });
}

pub fn bench_ecdsa(c: &mut Criterion) {
    let mut rng = Csprng::from_seed([5u8; 32]);
    for name in ["nistp256", "nistp384", "nistp521"] {
        let Some(curve) = EllipticCurve::find_by_name(name) else {
            continue;
        };
        let pair = EcdsaKeyPair::generate(curve, &mut rng);
        let message = [0u8; 64];
        let blob = pair.sign(&message).unwrap();

        c.bench_function(&format!("{name} sign"), |b| {
            b.iter(|| pair.sign(black_box(&message)).unwrap())
        });
        c.bench_function(&format!("{name} verify"), |b| {
            b.iter(|| pair.public_key().verify(black_box(&blob), black_box(&message)))
        });
    }
}

criterion_group!(benches, bench_montgomery, bench_ed25519, bench_ecdsa);
criterion_main!(benches);
