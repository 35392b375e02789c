use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tubely_core::AppError;
use uuid::Uuid;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User the token was issued to
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Turns a raw credential into the id of the user it belongs to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<Uuid, AppError>;
}

/// HS256 access-token verifier bound to one secret and issuer
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            validation,
        }
    }

    /// Mint a token for `user_id` that expires after `expires_in`.
    pub fn issue(&self, user_id: Uuid, expires_in: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token has expired",
                    ErrorKind::InvalidSignature => "Invalid token signature",
                    ErrorKind::InvalidIssuer => "Invalid token issuer",
                    ErrorKind::MissingRequiredClaim(_) => "Token is missing a required claim",
                    _ => "Invalid token",
                };
                tracing::debug!(error = %e, reason, "Token validation failed");
                AppError::InvalidCredential(reason.to_string())
            })
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn authenticate(&self, credential: &str) -> Result<Uuid, AppError> {
        self.validate_token(credential).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-jwt-secret-at-least-32-characters";

    #[tokio::test]
    async fn test_round_trip_yields_user_id() {
        let verifier = JwtVerifier::new(SECRET, "tubely-access");
        let user_id = Uuid::new_v4();
        let token = verifier.issue(user_id, Duration::hours(1)).unwrap();

        assert_eq!(verifier.authenticate(&token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new(SECRET, "tubely-access");
        let token = verifier
            .issue(Uuid::new_v4(), Duration::hours(-2))
            .unwrap();

        match verifier.authenticate(&token).await {
            Err(AppError::InvalidCredential(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let issuer = JwtVerifier::new("another-secret-that-is-32-characters!", "tubely-access");
        let verifier = JwtVerifier::new(SECRET, "tubely-access");
        let token = issuer.issue(Uuid::new_v4(), Duration::hours(1)).unwrap();

        assert!(matches!(
            verifier.authenticate(&token).await,
            Err(AppError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_issuer_rejected() {
        let issuer = JwtVerifier::new(SECRET, "someone-else");
        let verifier = JwtVerifier::new(SECRET, "tubely-access");
        let token = issuer.issue(Uuid::new_v4(), Duration::hours(1)).unwrap();

        assert!(matches!(
            verifier.authenticate(&token).await,
            Err(AppError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_rejected() {
        let verifier = JwtVerifier::new(SECRET, "tubely-access");
        assert!(matches!(
            verifier.authenticate("not-a-jwt").await,
            Err(AppError::InvalidCredential(_))
        ));
    }
}
