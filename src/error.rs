//! Error types for token signing, parsing and validation
//!
//! Two layers live here:
//!
//! - [`Error`]: a single lower-level failure (bad base64, bad key material,
//!   signature mismatch, resolver failure, ...).
//! - [`ValidationError`]: the outcome of [`Parser::parse`](crate::Parser::parse).
//!   It carries a [`ValidationErrorKind`] bitmask with every cause recorded
//!   during a parse, the first lower-level [`Error`] and the partially
//!   populated [`Token`], so callers can still inspect claims of a token that
//!   failed validation.

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

use crate::token::Token;

/// Boxed error returned by key resolvers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lower-level errors
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Invalid JWT format: expected three non-empty parts separated by '.'")]
    FormatInvalid,

    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    #[error("Base64URL decoding failed: {0}")]
    FormatInvalidBase64(String),

    #[error("JSON processing failed: {0}")]
    FormatInvalidJson(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ============================================================================
    // Signing Method Errors
    // ============================================================================
    #[error("Signing method '{0}' is not registered")]
    UnknownMethod(String),

    #[error("Signing method '{found}' not allowed. Allowed: {allowed:?}")]
    MethodNotAllowed { found: String, allowed: Vec<String> },

    // ============================================================================
    // Key Errors
    // ============================================================================
    #[error("Invalid key material: {0}")]
    KeyFormat(String),

    #[error("Key type mismatch for algorithm '{algorithm}': expected {expected}, got {actual}")]
    KeyTypeMismatch {
        algorithm: String,
        expected: String,
        actual: String,
    },

    #[error("No key material supplied for verification")]
    MissingKey,

    #[error("No key resolver was provided")]
    NoKeyResolver,

    #[error("Key resolution failed: {0}")]
    KeyResolution(#[source] BoxError),

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Result type alias for jwtcore operations
pub type Result<T> = std::result::Result<T, Error>;

bitflags! {
    /// Bitmask of validation causes
    ///
    /// Causes are independent and combine with `|`. Test membership with
    /// [`contains`](Self::contains) or [`intersects`](Self::intersects).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidationErrorKind: u32 {
        /// Token could not be split or decoded. Terminal.
        const MALFORMED = 1 << 0;
        /// No usable key: resolver absent or failing.
        const UNVERIFIABLE = 1 << 1;
        /// Signature did not verify, or the algorithm is unknown or disallowed.
        const SIGNATURE_INVALID = 1 << 2;
        /// `exp` is in the past.
        const EXPIRED = 1 << 3;
        /// `nbf` is in the future.
        const NOT_VALID_YET = 1 << 4;
        /// `iat` is in the future or older than the configured maximum age.
        const ISSUED_AT = 1 << 5;
        /// `aud` does not contain the required audience (only when configured).
        const AUDIENCE = 1 << 6;
        /// A custom claims predicate rejected the token.
        const CLAIMS_INVALID = 1 << 7;
    }
}

/// Aggregated result of a failed parse
///
/// Holds every cause recorded while parsing, the first lower-level error and
/// the token as far as it could be decoded.
pub struct ValidationError {
    kind: ValidationErrorKind,
    message: String,
    inner: Option<Error>,
    token: Box<Token>,
}

impl ValidationError {
    pub(crate) fn new(
        kind: ValidationErrorKind,
        message: String,
        inner: Option<Error>,
        token: Token,
    ) -> Self {
        Self {
            kind,
            message,
            inner,
            token: Box::new(token),
        }
    }

    /// All recorded causes
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// True if `kind` is among the recorded causes
    pub fn is(&self, kind: ValidationErrorKind) -> bool {
        self.kind.contains(kind)
    }

    /// Human-readable summary of all causes, joined with `; `
    pub fn message(&self) -> &str {
        &self.message
    }

    /// First lower-level error recorded, if any
    pub fn inner(&self) -> Option<&Error> {
        self.inner.as_ref()
    }

    /// The token as far as it was decoded
    ///
    /// For anything but [`MALFORMED`](ValidationErrorKind::MALFORMED) the
    /// header, claims and signature are populated.
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn into_token(self) -> Token {
        *self.token
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "{inner}"),
            None if self.message.is_empty() => f.write_str("token is invalid"),
            None => f.write_str(&self.message),
        }
    }
}

impl fmt::Debug for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
