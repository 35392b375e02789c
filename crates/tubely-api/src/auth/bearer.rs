use tubely_core::AppError;

const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// An absent header or an empty token is a missing credential; any other
/// scheme is an invalid one.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AppError> {
    let header = authorization
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::MissingCredential("Missing authorization header".to_string()))?;

    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AppError::InvalidCredential(
            "Invalid authorization header format".to_string(),
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::MissingCredential(
            "Missing bearer token".to_string(),
        ));
    }

    Ok(token)
}
