//! Authentication - password hashing, token issuance and the request extractor.
//!
//! Handlers never look the caller up from ambient state. A protected handler takes an
//! [`Actor`](crate::core::Actor) argument; the extractor in [`extractor`] builds it from the
//! bearer token or rejects the request with `401`.

/// Axum extractor turning a bearer token into an `Actor`
pub mod extractor;
/// HS256 token issuance and validation
pub mod jwt;
/// Argon2 password hashing
pub mod password;

pub use jwt::{Claims, JwtConfig, JwtService};
