mod validator;
mod value;

pub use validator::ClaimsValidation;
pub use value::{Map, Number, Value};

pub(crate) use value::map_from_json;

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// The claim set of a token
///
/// An open string → [`Value`] map. The registered claims from
/// [RFC 7519 Section 4.1](https://datatracker.ietf.org/doc/html/rfc7519#section-4.1)
/// have typed accessors; anything else is reached through the map.
///
/// # Examples
///
/// ```
/// use jwtcore::Claims;
///
/// let mut claims = Claims::new();
/// claims.insert("sub", "user-42");
/// claims.insert("exp", 1_700_000_000_i64);
///
/// assert_eq!(claims.subject(), Some("user-42"));
/// assert_eq!(claims.expiration(), Some(1_700_000_000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Claims(Map);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a claim, returning the previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Issuer (`iss`)
    pub fn issuer(&self) -> Option<&str> {
        self.string_claim("iss")
    }

    /// Subject (`sub`)
    pub fn subject(&self) -> Option<&str> {
        self.string_claim("sub")
    }

    /// Audience (`aud`), accepting both a single string and an array
    pub fn audience(&self) -> Vec<&str> {
        match self.0.get("aud") {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Expiration time (`exp`) in seconds since the Unix epoch
    pub fn expiration(&self) -> Option<f64> {
        self.numeric_claim("exp")
    }

    /// Not-before time (`nbf`) in seconds since the Unix epoch
    pub fn not_before(&self) -> Option<f64> {
        self.numeric_claim("nbf")
    }

    /// Issued-at time (`iat`) in seconds since the Unix epoch
    pub fn issued_at(&self) -> Option<f64> {
        self.numeric_claim("iat")
    }

    /// JWT ID (`jti`)
    pub fn jwt_id(&self) -> Option<&str> {
        self.string_claim("jti")
    }

    /// Deserialize the claim set into an application type
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        let json = serde_json::to_value(self).map_err(|e| Error::FormatInvalidJson(e.to_string()))?;
        serde_json::from_value(json).map_err(|e| Error::FormatInvalidJson(e.to_string()))
    }

    pub fn into_inner(self) -> Map {
        self.0
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    fn numeric_claim(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }
}

impl Deref for Claims {
    type Target = Map;

    fn deref(&self) -> &Map {
        &self.0
    }
}

impl DerefMut for Claims {
    fn deref_mut(&mut self) -> &mut Map {
        &mut self.0
    }
}

impl From<Map> for Claims {
    fn from(map: Map) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
