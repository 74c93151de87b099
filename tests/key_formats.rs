//! Key format tests
//!
//! Keys are loaded from every supported encoding and used for a full
//! sign and parse cycle, so a wrongly classified key shows up as a failed
//! verification rather than passing silently.

use std::sync::Arc;

use jwtcore::keys::{PrivateKey, PublicKey};
use jwtcore::*;

fn sign_and_parse(method: &str, signing_key: &Key, verifying_key: &Key) {
    let mut token = Token::new(Arc::clone(Registry::global().lookup(method).unwrap()));
    token.claims_mut().insert("sub", "key-format-test");
    let compact = token.signed_string(signing_key).unwrap();

    let parsed = Parser::new()
        .valid_methods([method])
        .build()
        .parse(&compact, Some(verifying_key))
        .unwrap_or_else(|e| panic!("{method}: {e}"));
    assert_eq!(parsed.claims().subject(), Some("key-format-test"));
}

fn pem_document(tag: &str, der: &[u8]) -> String {
    pem::encode(&pem::Pem::new(tag, der.to_vec()))
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_not_pem() {
    for result in [
        Key::rsa_private_pem(b"not a pem"),
        Key::rsa_public_pem(b"not a pem"),
        Key::ecdsa_private_pem(b"not a pem"),
        Key::public_pem(b"not a pem"),
    ] {
        assert!(matches!(result, Err(Error::KeyFormat(_))));
    }
}

#[test]
fn test_wrong_pem_tag() {
    let certificate = pem_document("CERTIFICATE", &[0x30, 0x00]);
    let err = Key::public_pem(certificate.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("CERTIFICATE"));

    let public = pem_document("PUBLIC KEY", &[0x30, 0x00]);
    assert!(Key::rsa_private_pem(public.as_bytes()).is_err());
}

#[test]
fn test_garbage_spki() {
    assert!(matches!(
        Key::public_spki(&[0x30, 0x03, 0x02, 0x01, 0x00]),
        Err(Error::KeyFormat(_))
    ));
}

#[test]
fn test_sec1_ec_private_key_rejected() {
    let sec1 = pem_document("EC PRIVATE KEY", &[0x30, 0x00]);
    let err = Key::ecdsa_private_pem(sec1.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("PKCS#8"));
}

#[cfg(feature = "rsa")]
#[test]
fn test_garbage_der_fails_at_use() {
    // DER constructors are lazy; bad bytes surface when the key is used
    let bogus = Key::rsa_private_pkcs8(vec![0x30, 0x00]);
    let err = Token::for_algorithm("RS256")
        .unwrap()
        .signed_string(&bogus)
        .unwrap_err();
    assert!(matches!(err, Error::KeyFormat(_)));
}

// ============================================================================
// RSA
// ============================================================================

#[cfg(feature = "rsa")]
mod rsa_keys {
    use super::*;
    use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use std::sync::OnceLock;

    fn private_key() -> &'static rsa::RsaPrivateKey {
        static KEY: OnceLock<rsa::RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| {
            rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("RSA key generation")
        })
    }

    fn pkcs1_public_key() -> Key {
        let der = private_key().to_public_key().to_pkcs1_der().unwrap();
        Key::rsa_public(der.as_bytes())
    }

    #[test]
    fn test_private_pkcs8_pem() {
        let pem = private_key().to_pkcs8_pem(LineEnding::LF).unwrap();
        let key = Key::rsa_private_pem(pem.as_bytes()).unwrap();
        assert_eq!(key.key_type(), "RSA private");
        sign_and_parse("RS256", &key, &pkcs1_public_key());
    }

    #[test]
    fn test_private_pkcs1_pem() {
        let pem = private_key().to_pkcs1_pem(LineEnding::LF).unwrap();
        let key = Key::rsa_private_pem(pem.as_bytes()).unwrap();
        sign_and_parse("PS256", &key, &pkcs1_public_key());
    }

    #[test]
    fn test_private_pkcs1_der() {
        let der = private_key().to_pkcs1_der().unwrap();
        let key = Key::rsa_private_pkcs1(der.as_bytes());
        sign_and_parse("RS384", &key, &pkcs1_public_key());
    }

    #[test]
    fn test_public_spki_der() {
        let der = private_key().to_public_key().to_public_key_der().unwrap();
        let key = Key::public_spki(der.as_bytes()).unwrap();
        assert!(matches!(key, Key::Public(PublicKey::Rsa(_))));

        let signing = Key::rsa_private_pkcs8(private_key().to_pkcs8_der().unwrap().as_bytes());
        sign_and_parse("RS512", &signing, &key);
    }

    #[test]
    fn test_public_spki_pem() {
        let pem = private_key()
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let signing = Key::rsa_private_pkcs8(private_key().to_pkcs8_der().unwrap().as_bytes());

        let key = Key::rsa_public_pem(pem.as_bytes()).unwrap();
        sign_and_parse("PS384", &signing, &key);

        let key = Key::public_pem(pem.as_bytes()).unwrap();
        sign_and_parse("PS512", &signing, &key);
    }

    #[test]
    fn test_public_pkcs1_pem() {
        let pem = private_key()
            .to_public_key()
            .to_pkcs1_pem(LineEnding::LF)
            .unwrap();
        let key = Key::rsa_public_pem(pem.as_bytes()).unwrap();
        assert!(matches!(key, Key::Public(PublicKey::Rsa(_))));
    }

    #[test]
    fn test_private_key_cannot_verify() {
        let signing = Key::rsa_private_pkcs8(private_key().to_pkcs8_der().unwrap().as_bytes());
        let compact = Token::for_algorithm("RS256")
            .unwrap()
            .signed_string(&signing)
            .unwrap();

        let err = Parser::new().parse(&compact, Some(&signing)).unwrap_err();
        assert!(matches!(
            err.inner(),
            Some(Error::KeyTypeMismatch { expected, .. }) if expected == "RSA public"
        ));
    }
}

// ============================================================================
// ECDSA
// ============================================================================

#[cfg(feature = "ecdsa")]
mod ecdsa_keys {
    use super::*;
    use ring::rand::SystemRandom;
    use ring::signature::{
        EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
    };

    // DER SubjectPublicKeyInfo prefixes up to the BIT STRING contents
    const P256_SPKI_PREFIX: &str = "3059301306072a8648ce3d020106082a8648ce3d030107034200";
    const P384_SPKI_PREFIX: &str = "3076301006072a8648ce3d020106052b81040022036200";

    fn hex(input: &str) -> Vec<u8> {
        (0..input.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&input[i..i + 2], 16).unwrap())
            .collect()
    }

    /// PKCS#8 private key and SPKI DER public key
    fn generate(curve: EcdsaCurve) -> (Vec<u8>, Vec<u8>) {
        let rng = SystemRandom::new();
        let (alg, prefix) = match curve {
            EcdsaCurve::P256 => (&ECDSA_P256_SHA256_FIXED_SIGNING, P256_SPKI_PREFIX),
            EcdsaCurve::P384 => (&ECDSA_P384_SHA384_FIXED_SIGNING, P384_SPKI_PREFIX),
        };

        let pkcs8 = EcdsaKeyPair::generate_pkcs8(alg, &rng).unwrap();
        let key_pair = EcdsaKeyPair::from_pkcs8(alg, pkcs8.as_ref(), &rng).unwrap();

        let mut spki = hex(prefix);
        spki.extend_from_slice(key_pair.public_key().as_ref());
        (pkcs8.as_ref().to_vec(), spki)
    }

    #[test]
    fn test_p256_spki_der() {
        let (pkcs8, spki) = generate(EcdsaCurve::P256);
        let key = Key::public_spki(&spki).unwrap();
        match &key {
            Key::Public(PublicKey::Ecdsa(public)) => {
                assert_eq!(public.curve(), EcdsaCurve::P256);
                assert_eq!(public.as_bytes().len(), 65);
            }
            other => panic!("unexpected key {other:?}"),
        }

        sign_and_parse("ES256", &Key::ecdsa_private_pkcs8(pkcs8), &key);
    }

    #[test]
    fn test_p384_pem() {
        let (pkcs8, spki) = generate(EcdsaCurve::P384);
        let private_pem = pem_document("PRIVATE KEY", &pkcs8);
        let public_pem = pem_document("PUBLIC KEY", &spki);

        let signing = Key::ecdsa_private_pem(private_pem.as_bytes()).unwrap();
        assert!(matches!(signing, Key::Private(PrivateKey::Ecdsa(_))));

        let verifying = Key::ecdsa_public_pem(public_pem.as_bytes()).unwrap();
        sign_and_parse("ES384", &signing, &verifying);

        let verifying = Key::public_pem(public_pem.as_bytes()).unwrap();
        sign_and_parse("ES384", &signing, &verifying);
    }

    #[test]
    fn test_ecdsa_pem_rejects_rsa_family() {
        let (_, spki) = generate(EcdsaCurve::P256);
        let public_pem = pem_document("PUBLIC KEY", &spki);
        assert!(Key::rsa_public_pem(public_pem.as_bytes()).is_err());
    }

    #[test]
    fn test_unsupported_curve() {
        // secp256k1 is not a supported curve
        let mut spki = hex("3056301006072a8648ce3d020106052b8104000a034200");
        spki.push(0x04);
        spki.extend_from_slice(&[0x11; 64]);

        let err = Key::public_spki(&spki).unwrap_err();
        assert!(err.to_string().contains("unsupported EC curve"));
    }
}
