use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::keys::{Key, RsaPrivateEncoding, RsaPrivateKey};

use tracing::trace;

// Select crypto backend based on features
#[cfg(feature = "aws-lc-rs")]
use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, RsaKeyPair, UnparsedPublicKey},
};
#[cfg(not(feature = "aws-lc-rs"))]
use ring::{
    rand::SystemRandom,
    signature::{self, RsaKeyPair, UnparsedPublicKey},
};

/// RS256 (RSASSA-PKCS1-v1_5 with SHA-256)
#[derive(Debug, Clone, Copy, Default)]
pub struct RS256;

/// RS384 (RSASSA-PKCS1-v1_5 with SHA-384)
#[derive(Debug, Clone, Copy, Default)]
pub struct RS384;

/// RS512 (RSASSA-PKCS1-v1_5 with SHA-512)
#[derive(Debug, Clone, Copy, Default)]
pub struct RS512;

/// PS256 (RSASSA-PSS with SHA-256)
#[derive(Debug, Clone, Copy, Default)]
pub struct PS256;

/// PS384 (RSASSA-PSS with SHA-384)
#[derive(Debug, Clone, Copy, Default)]
pub struct PS384;

/// PS512 (RSASSA-PSS with SHA-512)
#[derive(Debug, Clone, Copy, Default)]
pub struct PS512;

impl SigningMethod for RS256 {
    fn name(&self) -> &'static str {
        "RS256"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PKCS1_SHA256)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PKCS1_2048_8192_SHA256,
        )
    }
}

impl SigningMethod for RS384 {
    fn name(&self) -> &'static str {
        "RS384"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PKCS1_SHA384)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PKCS1_2048_8192_SHA384,
        )
    }
}

impl SigningMethod for RS512 {
    fn name(&self) -> &'static str {
        "RS512"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PKCS1_SHA512)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PKCS1_2048_8192_SHA512,
        )
    }
}

impl SigningMethod for PS256 {
    fn name(&self) -> &'static str {
        "PS256"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PSS_SHA256)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PSS_2048_8192_SHA256,
        )
    }
}

impl SigningMethod for PS384 {
    fn name(&self) -> &'static str {
        "PS384"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PSS_SHA384)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PSS_2048_8192_SHA384,
        )
    }
}

impl SigningMethod for PS512 {
    fn name(&self) -> &'static str {
        "PS512"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_rsa(self.name(), signing_input, key, &signature::RSA_PSS_SHA512)
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_rsa(
            self.name(),
            signing_input,
            signature,
            key,
            &signature::RSA_PSS_2048_8192_SHA512,
        )
    }
}

fn load_key_pair(key: &RsaPrivateKey) -> Result<RsaKeyPair> {
    let parsed = match key.encoding() {
        RsaPrivateEncoding::Pkcs8 => RsaKeyPair::from_pkcs8(key.as_der()),
        RsaPrivateEncoding::Pkcs1 => RsaKeyPair::from_der(key.as_der()),
    };
    parsed.map_err(|e| Error::KeyFormat(format!("invalid RSA private key: {e}")))
}

#[cfg(not(feature = "aws-lc-rs"))]
fn modulus_len(key_pair: &RsaKeyPair) -> usize {
    key_pair.public().modulus_len()
}

#[cfg(feature = "aws-lc-rs")]
fn modulus_len(key_pair: &RsaKeyPair) -> usize {
    key_pair.public_modulus_len()
}

/// Generic RSA signing (PKCS#1 v1.5 or PSS depending on `padding`)
fn sign_rsa(
    algorithm: &str,
    signing_input: &str,
    key: &Key,
    padding: &'static dyn signature::RsaEncoding,
) -> Result<Vec<u8>> {
    let key_pair = load_key_pair(key.as_rsa_private(algorithm)?)?;
    let rng = SystemRandom::new();

    let mut signature = vec![0u8; modulus_len(&key_pair)];
    key_pair
        .sign(padding, &rng, signing_input.as_bytes(), &mut signature)
        .map_err(|_| Error::Signing(format!("{algorithm} signing failed")))?;

    trace!(algorithm, len = signature.len(), "produced RSA signature");
    Ok(signature)
}

/// Generic RSA signature verification
fn verify_rsa(
    algorithm: &str,
    signing_input: &str,
    signature: &[u8],
    key: &Key,
    parameters: &'static dyn signature::VerificationAlgorithm,
) -> Result<()> {
    let rsa_key = key.as_rsa_public(algorithm)?;

    UnparsedPublicKey::new(parameters, rsa_key.as_der())
        .verify(signing_input.as_bytes(), signature)
        .map_err(|_| Error::SignatureInvalid)
}
