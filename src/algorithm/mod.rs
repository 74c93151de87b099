//! Signing methods
//!
//! HMAC methods are always available. RSA (`RS*`, `PS*`) and ECDSA (`ES*`)
//! methods are behind the `rsa` and `ecdsa` features. Asymmetric methods use
//! `ring` unless the `aws-lc-rs` feature selects that backend.

mod traits;

pub mod hmac;

#[cfg(feature = "rsa")]
pub mod rsa;

#[cfg(feature = "ecdsa")]
pub mod ecdsa;

use std::sync::Arc;

pub use traits::SigningMethod;

/// Every signing method compiled into this build
pub fn default_methods() -> Vec<Arc<dyn SigningMethod>> {
    let mut methods: Vec<Arc<dyn SigningMethod>> =
        vec![Arc::new(hmac::HS256), Arc::new(hmac::HS384), Arc::new(hmac::HS512)];

    #[cfg(feature = "rsa")]
    {
        methods.push(Arc::new(rsa::RS256));
        methods.push(Arc::new(rsa::RS384));
        methods.push(Arc::new(rsa::RS512));
        methods.push(Arc::new(rsa::PS256));
        methods.push(Arc::new(rsa::PS384));
        methods.push(Arc::new(rsa::PS512));
    }

    #[cfg(feature = "ecdsa")]
    {
        methods.push(Arc::new(ecdsa::ES256));
        methods.push(Arc::new(ecdsa::ES384));
    }

    methods
}
