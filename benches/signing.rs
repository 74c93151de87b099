//! Signing and verification benchmarks per method
//!
//! Compares the signing path (`Token::signed_string`) with parse-and-verify
//! for every registered method family.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jwtcore::*;

fn sample_token(method: &str) -> Token {
    let method = Arc::clone(Registry::global().lookup(method).unwrap());
    let mut token = Token::new(method);
    let claims = token.claims_mut();
    claims.insert("sub", "user123");
    claims.insert("iss", "https://example.com");
    claims.insert("exp", 9_999_999_999_i64);
    token
}

fn bench_method(c: &mut Criterion, method: &str, signing_key: &Key, verifying_key: &Key) {
    let mut token = sample_token(method);
    let compact = token.signed_string(signing_key).unwrap();
    let parser = Parser::new().valid_methods([method]).build();

    let mut group = c.benchmark_group(method);
    group.bench_function("sign", |b| {
        b.iter(|| black_box(&mut token).signed_string(signing_key))
    });
    group.bench_function("parse_and_verify", |b| {
        b.iter(|| parser.parse(black_box(&compact), Some(verifying_key)))
    });
    group.finish();
}

fn bench_hmac(c: &mut Criterion) {
    let key = Key::symmetric(b"benchmark-secret-key-benchmark-secret-key".to_vec());
    for method in ["HS256", "HS384", "HS512"] {
        bench_method(c, method, &key, &key);
    }
}

#[cfg(feature = "rsa")]
fn bench_rsa(c: &mut Criterion) {
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::pkcs8::EncodePrivateKey;

    let private_key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
    let signing = Key::rsa_private_pkcs8(private_key.to_pkcs8_der().unwrap().as_bytes());
    let verifying = Key::rsa_public(
        private_key
            .to_public_key()
            .to_pkcs1_der()
            .unwrap()
            .as_bytes(),
    );

    for method in ["RS256", "PS256", "RS512"] {
        bench_method(c, method, &signing, &verifying);
    }
}

#[cfg(not(feature = "rsa"))]
fn bench_rsa(_: &mut Criterion) {}

#[cfg(feature = "ecdsa")]
fn bench_ecdsa(c: &mut Criterion) {
    use ring::rand::SystemRandom;
    use ring::signature::{
        EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
    };

    let rng = SystemRandom::new();
    for (method, alg, curve) in [
        ("ES256", &ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaCurve::P256),
        ("ES384", &ECDSA_P384_SHA384_FIXED_SIGNING, EcdsaCurve::P384),
    ] {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &rng).unwrap();
        let key_pair = EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref(), &rng).unwrap();
        let signing = Key::ecdsa_private_pkcs8(pkcs8.as_ref());
        let verifying = Key::ecdsa_public(key_pair.public_key().as_ref(), curve);
        bench_method(c, method, &signing, &verifying);
    }
}

#[cfg(not(feature = "ecdsa"))]
fn bench_ecdsa(_: &mut Criterion) {}

criterion_group!(benches, bench_hmac, bench_rsa, bench_ecdsa);
criterion_main!(benches);
