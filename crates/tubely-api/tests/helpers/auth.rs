use chrono::Duration;
use tubely_api::auth::JwtVerifier;
use uuid::Uuid;

/// `Authorization` header value for a fresh token issued to `user_id`.
pub fn bearer_for(verifier: &JwtVerifier, user_id: Uuid) -> String {
    let token = verifier
        .issue(user_id, Duration::hours(1))
        .expect("Failed to issue token");
    format!("Bearer {}", token)
}

/// A token that expired an hour ago.
pub fn expired_bearer_for(verifier: &JwtVerifier, user_id: Uuid) -> String {
    let token = verifier
        .issue(user_id, Duration::hours(-1))
        .expect("Failed to issue token");
    format!("Bearer {}", token)
}
