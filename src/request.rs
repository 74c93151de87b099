//! Bearer token extraction from HTTP requests
//!
//! Reads `Authorization: Bearer <token>` (scheme matched case-insensitively)
//! and hands the credential to [`Parser::parse`]. For a full
//! [`http::Request`] the percent-decoded `access_token` query parameter is used when the
//! header is absent.
//!
//! These helpers always parse with [`Parser::default()`]. Build a [`Parser`]
//! and call [`extract_bearer`] yourself when you need allow-lists, leeway or a
//! custom registry.

use std::borrow::Cow;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue, Request};
use thiserror::Error;
use tracing::debug;

use crate::error::ValidationError;
use crate::parser::{KeyResolver, Parser};
use crate::token::Token;

const BEARER: &str = "bearer";
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Errors from request-based parsing
#[derive(Error, Debug)]
pub enum RequestError {
    /// No bearer credential in the request
    #[error("no token present in request")]
    NoTokenFound,

    /// A credential was found but failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Anything a bearer credential can be read from
pub trait CredentialSource {
    /// Raw `Authorization` header value, if present
    fn authorization(&self) -> Option<&HeaderValue>;

    /// Percent-decoded `access_token` query parameter, if the source carries a URI
    fn access_token(&self) -> Option<Cow<'_, str>> {
        None
    }
}

impl CredentialSource for HeaderMap {
    fn authorization(&self) -> Option<&HeaderValue> {
        self.get(AUTHORIZATION)
    }
}

impl<B> CredentialSource for Request<B> {
    fn authorization(&self) -> Option<&HeaderValue> {
        self.headers().authorization()
    }

    fn access_token(&self) -> Option<Cow<'_, str>> {
        let query = self.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(name, value)| *name == ACCESS_TOKEN_PARAM && !value.is_empty())
            .map(|(_, value)| value)
    }
}

/// Strip the `Bearer` scheme from an `Authorization` header value
///
/// ```
/// use jwtcore::request::strip_bearer;
///
/// assert_eq!(strip_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
/// assert_eq!(strip_bearer("bearer   abc"), Some("abc"));
/// assert_eq!(strip_bearer("Basic dXNlcjpwYXNz"), None);
/// ```
pub fn strip_bearer(value: &str) -> Option<&str> {
    let (scheme, credential) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }

    let credential = credential.trim();
    (!credential.is_empty()).then_some(credential)
}

/// Find the bearer credential in a request
///
/// The `Authorization` header wins. A header that is present but carries
/// another scheme, or is not valid UTF-8, does not fall through to the query
/// parameter.
pub fn extract_bearer<S: CredentialSource + ?Sized>(source: &S) -> Option<Cow<'_, str>> {
    match source.authorization() {
        Some(header) => header
            .to_str()
            .ok()
            .and_then(strip_bearer)
            .map(Cow::Borrowed),
        None => source.access_token(),
    }
}

/// Extract the bearer token and parse it with [`Parser::default()`]
pub fn parse_from_request<S: CredentialSource + ?Sized>(
    source: &S,
    resolver: Option<&dyn KeyResolver>,
) -> Result<Token, RequestError> {
    let credential = extract_bearer(source).ok_or_else(|| {
        debug!("no bearer credential in request");
        RequestError::NoTokenFound
    })?;

    Ok(Parser::default().parse(&credential, resolver)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn request(uri: &str, authorization: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer token"), Some("token"));
        assert_eq!(strip_bearer("BEARER token"), Some("token"));
        assert_eq!(strip_bearer("Bearer "), None);
        assert_eq!(strip_bearer("Bearer"), None);
        assert_eq!(strip_bearer("Bearertoken"), None);
        assert_eq!(strip_bearer("Token abc"), None);
    }

    #[test]
    fn test_header_map_source() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers).as_deref(), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer a.b.c"));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_query_fallback() {
        let req = request("/api?x=1&access_token=a.b.c", None);
        assert_eq!(extract_bearer(&req).as_deref(), Some("a.b.c"));

        let req = request("/api?access_token=q.q.q", Some("Bearer h.h.h"));
        assert_eq!(extract_bearer(&req).as_deref(), Some("h.h.h"));

        let req = request("/api?access_token=q.q.q", Some("Basic abc"));
        assert_eq!(extract_bearer(&req).as_deref(), None);

        let req = request("/api?access_token=", None);
        assert_eq!(extract_bearer(&req).as_deref(), None);
    }

    #[test]
    fn test_query_value_is_percent_decoded() {
        let req = request("/api?access_token=a%2Eb%2Ec&x=%20", None);
        assert_eq!(extract_bearer(&req).as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_non_utf8_header_blocks_query_fallback() {
        let mut req = request("/api?access_token=q.q.q", None);
        req.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Basic \xff\xfe").unwrap(),
        );
        assert_eq!(extract_bearer(&req).as_deref(), None);
        assert!(matches!(
            parse_from_request(&req, None),
            Err(RequestError::NoTokenFound)
        ));
    }

    #[test]
    fn test_no_token_found() {
        let req = request("/api", None);
        let result = parse_from_request(&req, None);
        assert!(matches!(result, Err(RequestError::NoTokenFound)));
    }

    #[test]
    fn test_validation_error_is_distinct() {
        let req = request("/api", Some("Bearer not-a-token"));
        let result = parse_from_request(&req, None);
        match result {
            Err(RequestError::Validation(err)) => {
                assert!(err.is(crate::ValidationErrorKind::MALFORMED));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
