//! Bearer token authentication
//!
//! The upload pipeline only needs "bearer token -> user id"; that contract is
//! the `IdentityVerifier` trait. `JwtVerifier` implements it with HS256 JWTs.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtVerifier;
pub use middleware::{auth_middleware, AuthState};
pub use models::AuthUser;

use async_trait::async_trait;
use tubely_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the user it was issued to.
    /// Any failure is `AppError::Unauthenticated`.
    async fn verify(&self, token: &str) -> Result<Uuid, AppError>;
}
