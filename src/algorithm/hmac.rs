use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::keys::Key;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

/// HS256 (HMAC with SHA-256)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS256;

/// HS384 (HMAC with SHA-384)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS384;

/// HS512 (HMAC with SHA-512)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS512;

#[derive(Clone, Copy)]
enum Digest {
    Sha256,
    Sha384,
    Sha512,
}

impl SigningMethod for HS256 {
    fn name(&self) -> &'static str {
        "HS256"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        compute_mac(Digest::Sha256, self.name(), signing_input, key)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_mac(Digest::Sha256, self.name(), signing_input, signature, key)
    }
}

impl SigningMethod for HS384 {
    fn name(&self) -> &'static str {
        "HS384"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        compute_mac(Digest::Sha384, self.name(), signing_input, key)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_mac(Digest::Sha384, self.name(), signing_input, signature, key)
    }
}

impl SigningMethod for HS512 {
    fn name(&self) -> &'static str {
        "HS512"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        compute_mac(Digest::Sha512, self.name(), signing_input, key)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_mac(Digest::Sha512, self.name(), signing_input, signature, key)
    }
}

fn compute_mac(digest: Digest, algorithm: &str, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
    let secret = key.as_symmetric(algorithm)?.as_bytes();
    if secret.is_empty() {
        return Err(Error::KeyFormat("HMAC secret must not be empty".to_string()));
    }

    let data = signing_input.as_bytes();
    let tag = match digest {
        Digest::Sha256 => mac_with::<Hmac<Sha256>>(secret, data)?,
        Digest::Sha384 => mac_with::<Hmac<Sha384>>(secret, data)?,
        Digest::Sha512 => mac_with::<Hmac<Sha512>>(secret, data)?,
    };
    Ok(tag)
}

fn mac_with<M: Mac + hmac::digest::KeyInit>(secret: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|_| Error::KeyFormat("invalid HMAC key length".to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Recompute the MAC and compare in constant time
fn verify_mac(
    digest: Digest,
    algorithm: &str,
    signing_input: &str,
    signature: &[u8],
    key: &Key,
) -> Result<()> {
    let expected = compute_mac(digest, algorithm, signing_input, key)?;

    if signature.len() != expected.len() {
        return Err(Error::SignatureInvalid);
    }

    if constant_time_eq(signature, &expected) {
        Ok(())
    } else {
        Err(Error::SignatureInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64url;

    const SIGNING_INPUT: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

    #[test]
    fn test_hs256_sign_and_verify() {
        let key = Key::symmetric(b"your-256-bit-secret".to_vec());
        let signature = HS256.sign(SIGNING_INPUT, &key).unwrap();
        assert_eq!(signature.len(), 32);
        assert!(HS256.verify(SIGNING_INPUT, &signature, &key).is_ok());
    }

    #[test]
    fn test_known_hs256_vector() {
        // Token from jwt.io with secret "your-256-bit-secret"
        let input = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ";
        let expected = "SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

        let key = Key::symmetric(b"your-256-bit-secret".to_vec());
        let signature = HS256.sign(input, &key).unwrap();
        assert_eq!(base64url::encode_bytes(&signature), expected);
    }

    #[test]
    fn test_hs384_and_hs512_lengths() {
        let key = Key::symmetric(b"secret".to_vec());
        assert_eq!(HS384.sign(SIGNING_INPUT, &key).unwrap().len(), 48);
        assert_eq!(HS512.sign(SIGNING_INPUT, &key).unwrap().len(), 64);
    }

    #[test]
    fn test_invalid_signature() {
        let key = Key::symmetric(b"your-256-bit-secret".to_vec());
        let result = HS256.verify(SIGNING_INPUT, b"wrong", &key);
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }

    #[test]
    fn test_wrong_secret() {
        let key = Key::symmetric(b"your-256-bit-secret".to_vec());
        let signature = HS256.sign(SIGNING_INPUT, &key).unwrap();

        let wrong = Key::symmetric(b"wrong-secret".to_vec());
        let result = HS256.verify(SIGNING_INPUT, &signature, &wrong);
        assert!(matches!(result, Err(Error::SignatureInvalid)));
    }

    #[test]
    fn test_digest_mismatch() {
        let key = Key::symmetric(b"secret".to_vec());
        let signature = HS512.sign(SIGNING_INPUT, &key).unwrap();
        assert!(matches!(
            HS256.verify(SIGNING_INPUT, &signature, &key),
            Err(Error::SignatureInvalid)
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let key = Key::symmetric(Vec::new());
        assert!(matches!(
            HS256.sign(SIGNING_INPUT, &key),
            Err(Error::KeyFormat(_))
        ));
    }

    #[test]
    fn test_wrong_key_type() {
        let rsa_key = Key::rsa_public(vec![1, 2, 3]);
        let result = HS256.verify(SIGNING_INPUT, b"signature", &rsa_key);
        assert!(matches!(result, Err(Error::KeyTypeMismatch { .. })));
    }
}
