/// Utility modules for jwtcore
pub mod base64url;
