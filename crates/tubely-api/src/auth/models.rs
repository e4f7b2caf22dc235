use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tubely_core::AppError;
use uuid::Uuid;

/// Identity of an authenticated caller, attached by `auth_middleware`
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

// Read from request extensions so it composes with Multipart
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().copied().ok_or_else(|| {
            HttpAppError(AppError::Unauthenticated(
                "Missing authenticated user".to_string(),
            ))
        })
    }
}
