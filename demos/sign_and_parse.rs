//! Sign a token, then parse it back with several parser configurations
//!
//! Run with `RUST_LOG=jwtcore=debug` to see every recorded validation cause.

use std::time::{SystemTime, UNIX_EPOCH};

use jwtcore::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== jwtcore - Sign and Parse ===\n");

    let key = Key::symmetric(b"your-256-bit-secret-key-here!".to_vec());
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    // Sign
    let mut token = Token::for_algorithm("HS256")?;
    token.header_mut().insert("kid", "demo-key");
    let claims = token.claims_mut();
    claims.insert("iss", "https://example.com");
    claims.insert("sub", "user-42");
    claims.insert("aud", "api.example.com");
    claims.insert("iat", now);
    claims.insert("exp", now + 3600);
    let compact = token.signed_string(&key)?;
    println!("Token: {compact}\n");

    // Parse with an allow-list and audience check
    let parser = Parser::new()
        .valid_methods(["HS256"])
        .claims_validation(
            ClaimsValidation::new()
                .leeway(60)
                .max_age(86_400)
                .require_audience("api.example.com"),
        )
        .build();

    match parser.parse(&compact, Some(&key)) {
        Ok(token) => {
            println!("Valid token");
            println!("  alg: {:?}", token.header().algorithm());
            println!("  kid: {:?}", token.header().key_id());
            println!("  sub: {:?}", token.claims().subject());
            println!("  exp: {:?}\n", token.claims().expiration());
        }
        Err(err) => println!("Rejected: {err}\n"),
    }

    // An expired token signed with another key reports both causes
    let mut stale = Token::for_algorithm("HS256")?;
    stale.claims_mut().insert("exp", now - 600);
    let stale = stale.signed_string(&Key::symmetric(b"some-other-secret".to_vec()))?;

    if let Err(err) = parser.parse(&stale, Some(&key)) {
        println!("Rejected: {err}");
        println!("  kind: {:?}", err.kind());
        println!("  expired: {}", err.is(ValidationErrorKind::EXPIRED));
        println!("  bad signature: {}", err.is(ValidationErrorKind::SIGNATURE_INVALID));
        println!("  message: {}", err.message());
        println!("  claims still readable: {:?}", err.token().claims().expiration());
    }

    Ok(())
}
