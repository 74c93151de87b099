//! Authenticate an `http::Request` carrying a bearer token
//!
//! The resolver picks the verification key by `kid`.

use http::header::AUTHORIZATION;
use http::Request;
use jwtcore::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn keys(kid: &str) -> Option<Key> {
    match kid {
        "current" => Some(Key::symmetric(b"current-signing-secret".to_vec())),
        "previous" => Some(Key::symmetric(b"previous-signing-secret".to_vec())),
        _ => None,
    }
}

fn resolve(token: &Token) -> std::result::Result<Option<Key>, BoxError> {
    match token.header().key_id() {
        Some(kid) => keys(kid).map(Some).ok_or_else(|| format!("unknown kid '{kid}'").into()),
        None => Ok(None),
    }
}

fn issue(kid: &str, subject: &str) -> Result<String> {
    let key = keys(kid).ok_or_else(|| Error::Signing(format!("no key '{kid}'")))?;
    let mut token = Token::for_algorithm("HS256")?;
    token.header_mut().insert("kid", kid);
    token.claims_mut().insert("sub", subject);
    token.signed_string(&key)
}

fn authenticate<B>(request: &Request<B>) {
    match parse_from_request(request, Some(&resolve)) {
        Ok(token) => info!(sub = ?token.claims().subject(), "authenticated"),
        Err(RequestError::NoTokenFound) => info!("anonymous request"),
        Err(RequestError::Validation(err)) => info!(kind = ?err.kind(), error = %err, "rejected"),
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let requests = [
        Request::builder()
            .uri("/orders")
            .header(AUTHORIZATION, format!("Bearer {}", issue("current", "alice")?))
            .body(())?,
        Request::builder()
            .uri(format!("/orders?access_token={}", issue("previous", "bob")?))
            .body(())?,
        Request::builder()
            .uri("/orders")
            .header(AUTHORIZATION, format!("Bearer {}", issue("current", "mallory")?.replace('.', "..")))
            .body(())?,
        Request::builder().uri("/orders").body(())?,
    ];

    for request in &requests {
        authenticate(request);
    }

    Ok(())
}
