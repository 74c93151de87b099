use std::fmt;

use crate::error::Result;
use crate::keys::Key;

/// Core trait that every token signing method implements
///
/// A method is identified by its canonical name (the `alg` header value).
/// Two instances with the same name are interchangeable, so implementations
/// are plain unit structs without state.
pub trait SigningMethod: Send + Sync {
    /// The algorithm identifier (e.g., "HS256", "RS256")
    fn name(&self) -> &'static str;

    /// Produce raw signature bytes over `signing_input`
    ///
    /// # Arguments
    /// * `signing_input` - The data to sign (`header.claims`, both encoded)
    /// * `key` - Secret for HMAC methods, private key for RSA/ECDSA
    fn sign(&self, signing_input: &str, key: &Key) -> Result<Vec<u8>>;

    /// Verify raw signature bytes over `signing_input`
    ///
    /// Any cryptographic mismatch is reported as
    /// [`Error::SignatureInvalid`](crate::Error::SignatureInvalid).
    fn verify(&self, signing_input: &str, signature: &[u8], key: &Key) -> Result<()>;
}

impl fmt::Debug for dyn SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningMethod({})", self.name())
    }
}
