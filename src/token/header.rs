use std::ops::Deref;

use serde::Serialize;

use crate::claims::{Map, Value};

/// Token header (JOSE header)
///
/// Holds at least `alg` and `typ`. Extra fields such as `kid` are kept as
/// they appeared in the token.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Header(Map);

impl Header {
    /// Header `{"alg": algorithm, "typ": "JWT"}`
    pub fn new(algorithm: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("alg".to_string(), Value::from(algorithm));
        fields.insert("typ".to_string(), Value::from("JWT"));
        Self(fields)
    }

    /// Algorithm name (`alg`), if present and a string
    pub fn algorithm(&self) -> Option<&str> {
        self.0.get("alg").and_then(Value::as_str)
    }

    /// Token type (`typ`)
    pub fn token_type(&self) -> Option<&str> {
        self.0.get("typ").and_then(Value::as_str)
    }

    /// Key ID (`kid`)
    pub fn key_id(&self) -> Option<&str> {
        self.0.get("kid").and_then(Value::as_str)
    }

    /// Set a header field, returning the previous value
    ///
    /// `alg` belongs to the signing method and is left unchanged; inserting it
    /// returns `None`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        if name == "alg" {
            return None;
        }
        self.0.insert(name, value.into())
    }

    pub(crate) fn set_algorithm(&mut self, algorithm: &str) {
        self.0.insert("alg".to_string(), Value::from(algorithm));
    }
}

impl Deref for Header {
    type Target = Map;

    fn deref(&self) -> &Map {
        &self.0
    }
}

impl From<Map> for Header {
    fn from(map: Map) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header() {
        let header = Header::new("HS256");
        assert_eq!(header.algorithm(), Some("HS256"));
        assert_eq!(header.token_type(), Some("JWT"));
        assert_eq!(header.key_id(), None);
        assert_eq!(
            serde_json::to_string(&header).unwrap(),
            r#"{"alg":"HS256","typ":"JWT"}"#
        );
    }

    #[test]
    fn test_key_id() {
        let mut header = Header::new("RS256");
        header.insert("kid", "key-2024");
        assert_eq!(header.key_id(), Some("key-2024"));
    }

    #[test]
    fn test_insert_keeps_alg() {
        let mut header = Header::new("HS512");
        assert_eq!(header.insert("alg", "none"), None);
        assert_eq!(header.algorithm(), Some("HS512"));
        assert_eq!(header.insert("typ", "at+jwt"), Some(Value::from("JWT")));
    }

    #[test]
    fn test_non_string_alg() {
        let mut map = Map::new();
        map.insert("alg".into(), Value::from(256_i64));
        assert_eq!(Header::from(map).algorithm(), None);
    }
}
