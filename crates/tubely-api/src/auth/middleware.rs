use crate::auth::{AuthUser, IdentityVerifier};
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header =
        header.ok_or_else(|| AppError::Unauthenticated("Couldn't find JWT".to_string()))?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Malformed authorization header".to_string()))
}

/// Verify the bearer token and attach the caller's identity to the request
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match bearer_token(header) {
        Ok(token) => token.to_string(),
        Err(e) => return HttpAppError(e).into_response(),
    };

    match auth_state.verifier.verify(&token).await {
        Ok(user_id) => {
            tracing::debug!(user_id = %user_id, "Authenticated request");
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_header() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Basic dXNlcg==")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
    }
}
