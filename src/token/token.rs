//! The `Token` value and its signing path

use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::algorithm::SigningMethod;
use crate::claims::Claims;
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::registry::Registry;
use crate::token::Header;
use crate::utils::base64url;

/// A JSON Web Token
///
/// Tokens come from two places:
///
/// - [`Token::new`] starts a token for signing. Set claims, then call
///   [`signed_string`](Self::signed_string).
/// - [`Parser::parse`](crate::Parser::parse) decodes a compact string. On
///   success [`is_valid`](Self::is_valid) is `true`; on failure the token is
///   still reachable through the returned
///   [`ValidationError`](crate::ValidationError).
///
/// # Examples
///
/// ```
/// use jwtcore::{Key, Token};
///
/// let mut token = Token::for_algorithm("HS256")?;
/// token.claims_mut().insert("sub", "user-1");
///
/// let compact = token.signed_string(&Key::symmetric(b"secret".to_vec()))?;
/// assert_eq!(compact.split('.').count(), 3);
/// # Ok::<(), jwtcore::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Token {
    raw: String,
    header: Header,
    claims: Claims,
    method: Option<Arc<dyn SigningMethod>>,
    signature: String,
    signing_input: String,
    valid: bool,
}

impl Token {
    /// New unsigned token with header `{"alg": method.name(), "typ": "JWT"}`
    pub fn new(method: Arc<dyn SigningMethod>) -> Self {
        Self {
            header: Header::new(method.name()),
            method: Some(method),
            ..Self::default()
        }
    }

    /// New unsigned token with the given claims
    pub fn with_claims(method: Arc<dyn SigningMethod>, claims: Claims) -> Self {
        Self {
            claims,
            ..Self::new(method)
        }
    }

    /// New unsigned token using a method from the global registry
    pub fn for_algorithm(name: &str) -> Result<Self> {
        let method = Registry::global()
            .lookup(name)
            .ok_or_else(|| Error::UnknownMethod(name.to_string()))?;
        Ok(Self::new(Arc::clone(method)))
    }

    /// Token with no header, claims or method
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn decoded(
        raw: &str,
        header: Header,
        claims: Claims,
        signature: &str,
        signing_input: &str,
    ) -> Self {
        Self {
            raw: raw.to_string(),
            header,
            claims,
            method: None,
            signature: signature.to_string(),
            signing_input: signing_input.to_string(),
            valid: false,
        }
    }

    pub(crate) fn set_method(&mut self, method: Arc<dyn SigningMethod>) {
        self.method = Some(method);
    }

    pub(crate) fn mark_valid(&mut self) {
        self.valid = true;
    }

    /// The compact string this token was parsed from or last signed as
    ///
    /// Empty for new tokens.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn claims_mut(&mut self) -> &mut Claims {
        &mut self.claims
    }

    pub fn set_claims(&mut self, claims: Claims) {
        self.claims = claims;
    }

    /// The signing method, once known
    pub fn method(&self) -> Option<&Arc<dyn SigningMethod>> {
        self.method.as_ref()
    }

    /// The encoded signature segment as it appeared in the token
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The encoded `header.claims` text the signature covers
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// True only for tokens returned by a successful parse
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Canonical `b64u(header).b64u(claims)` text to be signed
    ///
    /// `alg` is always taken from the signing method.
    pub fn signing_string(&self) -> Result<String> {
        let method = self.require_method()?;

        let mut header = self.header.clone();
        header.set_algorithm(method.name());

        let header_json = to_json(&header)?;
        let claims_json = to_json(&self.claims)?;

        Ok(format!(
            "{}.{}",
            base64url::encode_bytes(&header_json),
            base64url::encode_bytes(&claims_json)
        ))
    }

    /// Sign and return the complete compact token
    ///
    /// On success the encoded signature, signing input and compact string are
    /// recorded on the token. On failure the token is left untouched.
    pub fn signed_string(&mut self, key: &Key) -> Result<String> {
        let method = self.require_method()?;
        let signing_input = self.signing_string()?;
        let signature = base64url::encode_bytes(&method.sign(&signing_input, key)?);
        trace!(method = method.name(), "signed token");

        let compact = format!("{signing_input}.{signature}");
        self.signature = signature;
        self.signing_input = signing_input;
        self.raw.clone_from(&compact);
        Ok(compact)
    }

    fn require_method(&self) -> Result<&Arc<dyn SigningMethod>> {
        self.method
            .as_ref()
            .ok_or_else(|| Error::Signing("token has no signing method".to_string()))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::FormatInvalidJson(e.to_string()))
}
