//! Request authentication: bearer credential extraction and token verification.

pub mod bearer;
pub mod jwt;

pub use bearer::bearer_token;
pub use jwt::{AccessClaims, IdentityVerifier, JwtVerifier};
