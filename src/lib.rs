//! # jwtcore - Sign, Parse and Verify JSON Web Tokens
//!
//! **jwtcore** encodes, signs, parses and verifies compact JSON Web Tokens
//! (JWS compact serialization: `b64u(header).b64u(claims).b64u(signature)`).
//!
//! ## Overview
//!
//! A token is a JSON header, a JSON claim set and a signature. Signing
//! serializes header and claims canonically (sorted keys, compact JSON),
//! encodes them without padding and signs the joined text with a
//! [`SigningMethod`]. Parsing reverses this and runs a fixed sequence of
//! checks. Each failed check adds a cause to a [`ValidationErrorKind`]
//! bitmask, so a caller can see that a token is both badly signed and
//! expired. Only a structurally broken token stops the sequence.
//!
//! ## Quick Start
//!
//! ```
//! use jwtcore::{Claims, Key, Parser, Token};
//!
//! let key = Key::symmetric(b"your-256-bit-secret".to_vec());
//!
//! let mut token = Token::for_algorithm("HS256")?;
//! token.claims_mut().insert("sub", "user-1");
//! let compact = token.signed_string(&key)?;
//!
//! let parser = Parser::new().valid_methods(["HS256"]).build();
//! let parsed = parser.parse(&compact, Some(&key)).expect("valid token");
//! assert_eq!(parsed.claims().subject(), Some("user-1"));
//! # Ok::<(), jwtcore::Error>(())
//! ```
//!
//! ## Validation Flow
//!
//! ```text
//! compact string
//!     │ split into three segments, decode header and claims   → MALFORMED (stop)
//!     ▼
//! method lookup (registry + allow-list)                       → SIGNATURE_INVALID
//!     │
//! key resolver (called once)                                  → UNVERIFIABLE
//!     │
//! signature over the original `header.claims` text            → SIGNATURE_INVALID
//!     │
//! claim checks: exp, nbf (+ iat, aud, custom when enabled)    → EXPIRED, NOT_VALID_YET, ...
//!     ▼
//! Ok(Token) or Err(ValidationError { kind, inner, token })
//! ```
//!
//! The [`ValidationError`] keeps the decoded token, so claims of an expired
//! or badly signed token remain readable.
//!
//! ## Key Resolution
//!
//! The parser never stores keys. It calls a [`KeyResolver`] with the decoded
//! (still untrusted) token. A [`Key`] resolves to itself; closures work too:
//!
//! ```
//! use jwtcore::{BoxError, Key, Token};
//!
//! let resolver = |token: &Token| -> Result<Option<Key>, BoxError> {
//!     match token.header().key_id() {
//!         Some("primary") => Ok(Some(Key::symmetric(b"primary-secret".to_vec()))),
//!         Some(other) => Err(format!("unknown key id {other}").into()),
//!         None => Ok(None),
//!     }
//! };
//! # let _ = resolver;
//! ```
//!
//! ## Algorithm Support
//!
//! All methods implement the [`SigningMethod`] trait and live in a
//! [`Registry`]:
//!
//! - **HMAC** (always enabled): HS256, HS384, HS512
//! - **RSA** (with `rsa` feature): RS256, RS384, RS512, PS256, PS384, PS512
//! - **ECDSA** (with `ecdsa` feature): ES256, ES384
//!
//! ## Features
//!
//! - **`rsa`**, **`ecdsa`**: asymmetric methods (both on by default)
//! - **`aws-lc-rs`**: use `aws-lc-rs` instead of `ring` for RSA/ECDSA
//! - **`all-algorithms`**: RSA + ECDSA
//! - **`request`**: bearer token extraction for `http` requests (default)
//!
//! ## Security
//!
//! ### Algorithm Allow-Lists
//!
//! Restrict algorithms with [`Parser::valid_methods`]. A token whose `alg` is
//! not listed fails as `SIGNATURE_INVALID` even if its signature is correct.
//!
//! ### "none" Algorithm
//!
//! No unsigned method is registered, so `"alg": "none"` never verifies.
//!
//! ### Timing Attack Protection
//!
//! HMAC signature verification uses constant-time comparison via the
//! [`constant_time_eq`](https://crates.io/crates/constant_time_eq) crate.
//!
//! ## References
//!
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515) JSON Web Signature (JWS)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519) JSON Web Token (JWT)
//! - [RFC 8725](https://datatracker.ietf.org/doc/html/rfc8725) JSON Web Token Best Current Practices

// Core modules
pub mod error;
pub(crate) mod limits;
pub mod utils;

// Signing methods and keys
pub mod algorithm;
pub mod keys;
pub mod registry;

// Claims and validation
pub mod claims;

// Token types
pub mod token;

// Parser (main public API)
pub mod parser;

// Request extraction
#[cfg(feature = "request")]
pub mod request;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use token::{Header, Token};
pub use parser::{KeyResolver, Parser, ParserConfig};
pub use registry::{Registry, RegistryBuilder};

pub use algorithm::SigningMethod;
pub use claims::{Claims, ClaimsValidation, Map, Number, Value};
pub use error::{BoxError, Error, Result, ValidationError, ValidationErrorKind};
pub use keys::{EcdsaCurve, Key};

#[cfg(feature = "request")]
pub use request::{parse_from_request, RequestError};
