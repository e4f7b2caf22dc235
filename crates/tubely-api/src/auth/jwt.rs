use super::IdentityVerifier;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tubely_core::AppError;
use uuid::Uuid;

/// Access token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // user_id
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

/// HS256 access token verifier
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Issue an access token for `user_id`, valid for `expires_in`
    pub fn issue(&self, user_id: Uuid, expires_in: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn validate_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::Unauthenticated("Token has expired".to_string())
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                        AppError::Unauthenticated("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthenticated("Couldn't validate JWT".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let claims = self.validate_token(token)?;
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthenticated("Invalid token subject".to_string()))
    }
}
