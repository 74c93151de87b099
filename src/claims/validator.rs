use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::claims::Claims;
use crate::error::ValidationErrorKind;
use crate::limits::MAX_LEEWAY_SECONDS;

type CustomCheck = Arc<dyn Fn(&Claims) -> Result<(), String> + Send + Sync>;
type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Claim checks run by the parser after signature verification
///
/// Expiration and not-before are checked by default. Issued-at, audience and
/// a custom predicate are opt-in. The serializable fields can be loaded from
/// a configuration file; the predicate and clock are set in code.
///
/// ```
/// use jwtcore::ClaimsValidation;
///
/// let validation = ClaimsValidation::new()
///     .leeway(30)
///     .validate_iat(true)
///     .require_audience("api.example.com");
/// assert_eq!(validation.leeway_seconds(), 30);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ClaimsValidation {
    /// Check `exp` against the current time
    pub validate_exp: bool,

    /// Check `nbf` against the current time
    pub validate_nbf: bool,

    /// Check that `iat` is not in the future
    pub validate_iat: bool,

    /// Clock skew tolerance in seconds, capped at five minutes
    pub leeway: u64,

    /// Reject tokens issued longer ago than this, whether or not
    /// `validate_iat` is set
    pub max_age: Option<u64>,

    /// Audience that `aud` must contain
    pub required_audience: Option<String>,

    #[serde(skip)]
    custom: Option<CustomCheck>,

    #[serde(skip)]
    clock: Option<Clock>,
}

impl Default for ClaimsValidation {
    fn default() -> Self {
        Self {
            validate_exp: true,
            validate_nbf: true,
            validate_iat: false,
            leeway: 0,
            max_age: None,
            required_audience: None,
            custom: None,
            clock: None,
        }
    }
}

impl fmt::Debug for ClaimsValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimsValidation")
            .field("validate_exp", &self.validate_exp)
            .field("validate_nbf", &self.validate_nbf)
            .field("validate_iat", &self.validate_iat)
            .field("leeway", &self.leeway)
            .field("max_age", &self.max_age)
            .field("required_audience", &self.required_audience)
            .field("custom", &self.custom.is_some())
            .field("clock", &self.clock.is_some())
            .finish()
    }
}

impl ClaimsValidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set clock skew tolerance
    pub fn leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    /// Enable or disable expiration validation
    pub fn validate_exp(mut self, enabled: bool) -> Self {
        self.validate_exp = enabled;
        self
    }

    /// Enable or disable not-before validation
    pub fn validate_nbf(mut self, enabled: bool) -> Self {
        self.validate_nbf = enabled;
        self
    }

    /// Enable or disable issued-at validation
    pub fn validate_iat(mut self, enabled: bool) -> Self {
        self.validate_iat = enabled;
        self
    }

    /// Set maximum token age, measured from `iat`
    pub fn max_age(mut self, seconds: u64) -> Self {
        self.validate_iat = true;
        self.max_age = Some(seconds);
        self
    }

    /// Require a specific audience
    pub fn require_audience(mut self, audience: impl Into<String>) -> Self {
        self.required_audience = Some(audience.into());
        self
    }

    /// Add a custom predicate; an `Err` message is reported as `CLAIMS_INVALID`
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&Claims) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Replace the wall clock (seconds since the Unix epoch)
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Effective leeway after applying the cap
    pub fn leeway_seconds(&self) -> u64 {
        self.leeway.min(MAX_LEEWAY_SECONDS)
    }

    /// Run every enabled check and return all violations
    ///
    /// Time claims that are absent or not numeric are skipped.
    pub fn check(&self, claims: &Claims) -> Vec<(ValidationErrorKind, String)> {
        let now = self.now() as f64;
        let leeway = self.leeway_seconds() as f64;
        let mut violations = Vec::new();

        if self.validate_exp {
            if let Some(exp) = claims.expiration() {
                if exp < now - leeway {
                    violations.push((
                        ValidationErrorKind::EXPIRED,
                        format!("token is expired by {}s", now - exp),
                    ));
                }
            }
        }

        if self.validate_nbf {
            if let Some(nbf) = claims.not_before() {
                if nbf > now + leeway {
                    violations.push((
                        ValidationErrorKind::NOT_VALID_YET,
                        "token is not valid yet".to_string(),
                    ));
                }
            }
        }

        if let Some(iat) = claims.issued_at() {
            if self.validate_iat && iat > now + leeway {
                violations.push((
                    ValidationErrorKind::ISSUED_AT,
                    "token used before issued".to_string(),
                ));
            } else if let Some(max_age) = self.max_age {
                if now - iat > max_age as f64 + leeway {
                    violations.push((
                        ValidationErrorKind::ISSUED_AT,
                        format!("token is older than {max_age}s"),
                    ));
                }
            }
        }

        if let Some(required) = &self.required_audience {
            if !claims.audience().iter().any(|aud| aud == required) {
                violations.push((
                    ValidationErrorKind::AUDIENCE,
                    format!("token audience does not contain '{required}'"),
                ));
            }
        }

        if let Some(custom) = &self.custom {
            if let Err(message) = custom(claims) {
                violations.push((ValidationErrorKind::CLAIMS_INVALID, message));
            }
        }

        violations
    }

    fn now(&self) -> i64 {
        match &self.clock {
            Some(clock) => clock(),
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default(),
        }
    }
}
