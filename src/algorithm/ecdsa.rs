use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::keys::{EcdsaCurve, Key};

use tracing::trace;

// Select crypto backend based on features
#[cfg(feature = "aws-lc-rs")]
use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, EcdsaKeyPair, UnparsedPublicKey},
};
#[cfg(not(feature = "aws-lc-rs"))]
use ring::{
    rand::SystemRandom,
    signature::{self, EcdsaKeyPair, UnparsedPublicKey},
};

/// ES256 (ECDSA with P-256 and SHA-256)
#[derive(Debug, Clone, Copy, Default)]
pub struct ES256;

/// ES384 (ECDSA with P-384 and SHA-384)
#[derive(Debug, Clone, Copy, Default)]
pub struct ES384;

impl SigningMethod for ES256 {
    fn name(&self) -> &'static str {
        "ES256"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_ecdsa(
            self.name(),
            signing_input,
            key,
            &signature::ECDSA_P256_SHA256_FIXED_SIGNING,
        )
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_ecdsa(
            self.name(),
            EcdsaCurve::P256,
            signing_input,
            signature,
            key,
            &signature::ECDSA_P256_SHA256_FIXED,
        )
    }
}

impl SigningMethod for ES384 {
    fn name(&self) -> &'static str {
        "ES384"
    }

    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>> {
        sign_ecdsa(
            self.name(),
            signing_input,
            key,
            &signature::ECDSA_P384_SHA384_FIXED_SIGNING,
        )
    }

    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()> {
        verify_ecdsa(
            self.name(),
            EcdsaCurve::P384,
            signing_input,
            signature,
            key,
            &signature::ECDSA_P384_SHA384_FIXED,
        )
    }
}

#[cfg(not(feature = "aws-lc-rs"))]
fn load_key_pair(
    signing: &'static signature::EcdsaSigningAlgorithm,
    pkcs8: &[u8],
    rng: &SystemRandom,
) -> std::result::Result<EcdsaKeyPair, ring::error::KeyRejected> {
    EcdsaKeyPair::from_pkcs8(signing, pkcs8, rng)
}

#[cfg(feature = "aws-lc-rs")]
fn load_key_pair(
    signing: &'static signature::EcdsaSigningAlgorithm,
    pkcs8: &[u8],
    _rng: &SystemRandom,
) -> std::result::Result<EcdsaKeyPair, aws_lc_rs::error::KeyRejected> {
    EcdsaKeyPair::from_pkcs8(signing, pkcs8)
}

/// Generic ECDSA signing producing the fixed-width R||S encoding
fn sign_ecdsa(
    algorithm: &str,
    signing_input: &str,
    key: &Key,
    signing: &'static signature::EcdsaSigningAlgorithm,
) -> Result<Vec<u8>> {
    let private_key = key.as_ecdsa_private(algorithm)?;
    let rng = SystemRandom::new();

    // A key on the wrong curve is rejected here
    let key_pair = load_key_pair(signing, private_key.as_pkcs8(), &rng)
        .map_err(|e| Error::KeyFormat(format!("invalid ECDSA private key for {algorithm}: {e}")))?;

    let signature = key_pair
        .sign(&rng, signing_input.as_bytes())
        .map_err(|_| Error::Signing(format!("{algorithm} signing failed")))?;

    trace!(algorithm, len = signature.as_ref().len(), "produced ECDSA signature");
    Ok(signature.as_ref().to_vec())
}

/// Generic ECDSA signature verification
fn verify_ecdsa(
    algorithm: &str,
    curve: EcdsaCurve,
    signing_input: &str,
    signature: &[u8],
    key: &Key,
    parameters: &'static dyn signature::VerificationAlgorithm,
) -> Result<()> {
    let ecdsa_key = key.as_ecdsa_public(algorithm)?;

    // Verify curve matches algorithm
    if ecdsa_key.curve() != curve {
        return Err(Error::KeyTypeMismatch {
            algorithm: algorithm.to_string(),
            expected: format!("ECDSA {curve:?}"),
            actual: format!("ECDSA {:?}", ecdsa_key.curve()),
        });
    }

    UnparsedPublicKey::new(parameters, ecdsa_key.as_bytes())
        .verify(signing_input.as_bytes(), signature)
        .map_err(|_| Error::SignatureInvalid)
}
