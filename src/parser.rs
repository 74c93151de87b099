//! Token parser and validator
//!
//! [`Parser::parse`] decodes a compact token, resolves its signing method,
//! asks a [`KeyResolver`] for the verification key, verifies the signature
//! and runs the claim checks. Every failure is recorded as a cause in the
//! returned [`ValidationError`] instead of stopping at the first one. Only
//! structural failures ([`MALFORMED`](ValidationErrorKind::MALFORMED)) end the
//! parse early.
//!
//! ```text
//! split + decode ──► method lookup ──► key resolver ──► verify ──► claim checks
//!   MALFORMED        SIGNATURE_INVALID  UNVERIFIABLE    SIGNATURE_   EXPIRED,
//!   (terminal)                                          INVALID      NOT_VALID_YET, ...
//! ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::algorithm::SigningMethod;
use crate::claims::{map_from_json, Claims, ClaimsValidation};
use crate::error::{BoxError, Error, Result, ValidationError, ValidationErrorKind};
use crate::keys::Key;
use crate::limits::{
    MAX_DECODED_CLAIMS_SIZE, MAX_DECODED_HEADER_SIZE, MAX_DECODED_SIGNATURE_SIZE,
    MAX_TOKEN_LENGTH,
};
use crate::registry::Registry;
use crate::token::{Header, Token};
use crate::utils::base64url;

/// Supplies the verification key for a decoded token
///
/// The resolver sees the header and claims (for example to pick a key by
/// `kid`) before the signature has been checked, so it must not trust them.
///
/// - `Ok(Some(key))`: verify with `key`
/// - `Ok(None)`: no key for this token; reported as `SIGNATURE_INVALID`
/// - `Err(_)`: reported as `UNVERIFIABLE` with the error as inner cause
///
/// Closures with the matching signature implement this trait, and a [`Key`]
/// resolves to itself.
pub trait KeyResolver {
    fn resolve(&self, token: &Token) -> std::result::Result<Option<Key>, BoxError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&Token) -> std::result::Result<Option<Key>, BoxError>,
{
    fn resolve(&self, token: &Token) -> std::result::Result<Option<Key>, BoxError> {
        self(token)
    }
}

impl KeyResolver for Key {
    fn resolve(&self, _token: &Token) -> std::result::Result<Option<Key>, BoxError> {
        Ok(Some(self.clone()))
    }
}

/// Parser settings
///
/// Deserializable so services can load it from their configuration files:
///
/// ```
/// use jwtcore::ParserConfig;
///
/// let config: ParserConfig = serde_json::from_str(
///     r#"{"valid_methods": ["RS256"], "claims": {"leeway": 30}}"#,
/// ).unwrap();
/// assert_eq!(config.valid_methods, vec!["RS256"]);
/// assert!(!config.use_arbitrary_precision);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Allowed `alg` names; empty allows every registered method
    pub valid_methods: Vec<String>,

    /// Keep numeric claims as exact decimal literals instead of `f64`
    pub use_arbitrary_precision: bool,

    /// Skip all claim checks (time, audience, custom)
    pub skip_claims_validation: bool,

    /// Claim checks to run after signature verification
    pub claims: ClaimsValidation,
}

/// Token parser
///
/// Holds configuration and a shared [`Registry`]; parsing only touches
/// call-local state, so one parser can serve many threads.
///
/// # Example
///
/// ```
/// use jwtcore::{Key, Parser, Token, ValidationErrorKind};
///
/// let key = Key::symmetric(b"secret".to_vec());
/// let compact = Token::for_algorithm("HS256")?.signed_string(&key)?;
///
/// let parser = Parser::new().valid_methods(["HS256"]).build();
/// let token = parser.parse(&compact, Some(&key)).unwrap();
/// assert!(token.is_valid());
///
/// let err = parser.parse(&compact, None).unwrap_err();
/// assert_eq!(err.kind(), ValidationErrorKind::UNVERIFIABLE);
/// # Ok::<(), jwtcore::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
    registry: Arc<Registry>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Parser with default settings over the global registry
    pub fn new() -> Self {
        Self::from_config(ParserConfig::default())
    }

    pub fn from_config(config: ParserConfig) -> Self {
        Self {
            config,
            registry: Arc::clone(Registry::global()),
        }
    }

    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            config: ParserConfig::default(),
            registry,
        }
    }

    /// Restrict accepted algorithms
    pub fn valid_methods<I, S>(&mut self, methods: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.valid_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn use_arbitrary_precision(&mut self, enabled: bool) -> &mut Self {
        self.config.use_arbitrary_precision = enabled;
        self
    }

    pub fn skip_claims_validation(&mut self, skip: bool) -> &mut Self {
        self.config.skip_claims_validation = skip;
        self
    }

    pub fn claims_validation(&mut self, validation: ClaimsValidation) -> &mut Self {
        self.config.claims = validation;
        self
    }

    pub fn registry(&mut self, registry: Arc<Registry>) -> &mut Self {
        self.registry = registry;
        self
    }

    /// Finish configuration
    pub fn build(&mut self) -> Self {
        self.clone()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse, verify and validate a compact token
    ///
    /// On failure the error carries every recorded cause and the token as far
    /// as it was decoded. The resolver is called exactly once for every
    /// structurally valid token.
    pub fn parse(
        &self,
        token: &str,
        resolver: Option<&dyn KeyResolver>,
    ) -> std::result::Result<Token, ValidationError> {
        let mut token = match self.decode(token) {
            Ok(token) => token,
            Err(err) => {
                debug!(cause = ?ValidationErrorKind::MALFORMED, error = %err, "token rejected");
                let message = err.to_string();
                return Err(ValidationError::new(
                    ValidationErrorKind::MALFORMED,
                    message,
                    Some(err),
                    Token::empty(),
                ));
            }
        };

        let mut findings = Findings::new(token.header().algorithm().unwrap_or_default());

        let method = match self.resolve_method(token.header()) {
            Ok(method) => {
                token.set_method(Arc::clone(&method));
                Some(method)
            }
            Err(err) => {
                findings.record(
                    ValidationErrorKind::SIGNATURE_INVALID,
                    "signing method is invalid",
                    Some(err),
                );
                None
            }
        };

        let key = match resolver {
            None => {
                findings.record(
                    ValidationErrorKind::UNVERIFIABLE,
                    "no key resolver was provided",
                    Some(Error::NoKeyResolver),
                );
                None
            }
            Some(resolver) => match resolver.resolve(&token) {
                Ok(Some(key)) => Some(key),
                Ok(None) => {
                    if method.is_some() {
                        findings.record(
                            ValidationErrorKind::SIGNATURE_INVALID,
                            "no key supplied for verification",
                            Some(Error::MissingKey),
                        );
                    }
                    None
                }
                Err(err) => {
                    findings.record(
                        ValidationErrorKind::UNVERIFIABLE,
                        "key resolution failed",
                        Some(Error::KeyResolution(err)),
                    );
                    None
                }
            },
        };

        if let (Some(method), Some(key)) = (&method, &key) {
            if let Err(err) = verify_signature(method.as_ref(), &token, key) {
                findings.record(
                    ValidationErrorKind::SIGNATURE_INVALID,
                    "signature is invalid",
                    Some(err),
                );
            }
        }

        if !self.config.skip_claims_validation {
            for (kind, message) in self.config.claims.check(token.claims()) {
                findings.record(kind, message, None);
            }
        }

        findings.finish(token)
    }

    /// Decode a token without verifying it
    ///
    /// Useful to read `kid` or `iss` before choosing a key. Nothing in the
    /// returned token is trustworthy; [`Token::is_valid`] is always `false`.
    pub fn parse_unverified(&self, token: &str) -> Result<Token> {
        let mut token = self.decode(token)?;
        let method = self.lookup(token.header())?;
        token.set_method(method);
        Ok(token)
    }

    fn decode(&self, raw: &str) -> Result<Token> {
        if raw.len() > MAX_TOKEN_LENGTH {
            return Err(Error::TokenTooLarge {
                size: raw.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        let mut segments = raw.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(Error::FormatInvalid);
        };
        if header_b64.is_empty() || claims_b64.is_empty() || signature_b64.is_empty() {
            return Err(Error::FormatInvalid);
        }

        let header = decode_object(header_b64, MAX_DECODED_HEADER_SIZE, false, "header")?;
        let claims = decode_object(
            claims_b64,
            MAX_DECODED_CLAIMS_SIZE,
            self.config.use_arbitrary_precision,
            "claims",
        )?;

        let signing_input = &raw[..header_b64.len() + 1 + claims_b64.len()];
        Ok(Token::decoded(
            raw,
            Header::from(header),
            Claims::from(claims),
            signature_b64,
            signing_input,
        ))
    }

    /// Registry lookup plus allow-list check
    fn resolve_method(&self, header: &Header) -> Result<Arc<dyn SigningMethod>> {
        let method = self.lookup(header)?;

        let allowed = &self.config.valid_methods;
        if !allowed.is_empty() && !allowed.iter().any(|name| name == method.name()) {
            return Err(Error::MethodNotAllowed {
                found: method.name().to_string(),
                allowed: allowed.clone(),
            });
        }

        Ok(method)
    }

    fn lookup(&self, header: &Header) -> Result<Arc<dyn SigningMethod>> {
        let name = header
            .algorithm()
            .ok_or_else(|| Error::MissingField("alg".to_string()))?;
        self.registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UnknownMethod(name.to_string()))
    }
}

fn decode_object(
    segment: &str,
    max_size: usize,
    precise: bool,
    what: &str,
) -> Result<crate::claims::Map> {
    let bytes = base64url::decode_bytes(segment, max_size)?;
    let json: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::FormatInvalidJson(format!("failed to parse {what}: {e}")))?;

    match json {
        serde_json::Value::Object(fields) => Ok(map_from_json(fields, precise)),
        _ => Err(Error::FormatInvalidJson(format!("{what} is not a JSON object"))),
    }
}

/// Verify over the original encoded `header.claims` text
fn verify_signature(method: &dyn SigningMethod, token: &Token, key: &Key) -> Result<()> {
    let signature = base64url::decode_bytes(token.signature(), MAX_DECODED_SIGNATURE_SIZE)?;
    method.verify(token.signing_input(), &signature, key)
}

/// Causes accumulated during one parse
struct Findings {
    algorithm: String,
    kind: ValidationErrorKind,
    messages: Vec<String>,
    inner: Option<Error>,
}

impl Findings {
    fn new(algorithm: &str) -> Self {
        Self {
            algorithm: algorithm.to_string(),
            kind: ValidationErrorKind::empty(),
            messages: Vec::new(),
            inner: None,
        }
    }

    fn record(&mut self, kind: ValidationErrorKind, message: impl Into<String>, inner: Option<Error>) {
        let message = message.into();
        debug!(cause = ?kind, alg = self.algorithm.as_str(), %message, "validation cause recorded");

        self.kind |= kind;
        self.messages.push(message);
        if self.inner.is_none() {
            self.inner = inner;
        }
    }

    fn finish(self, mut token: Token) -> std::result::Result<Token, ValidationError> {
        if self.kind.is_empty() {
            token.mark_valid();
            return Ok(token);
        }

        Err(ValidationError::new(
            self.kind,
            self.messages.join("; "),
            self.inner,
            token,
        ))
    }
}
