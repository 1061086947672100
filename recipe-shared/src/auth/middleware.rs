/// Request authentication for Axum
///
/// Extracts the bearer token from the `Authorization` header, validates it,
/// and yields an [`AuthContext`]. The server's auth layer inserts that context
/// into the request extensions; handlers read the caller's user ID from it and
/// pass it explicitly to every store and query call.
///
/// # Example
///
/// ```
/// use axum::http::HeaderMap;
/// use recipe_shared::auth::middleware::{authenticate, AuthError};
///
/// let headers = HeaderMap::new();
/// let result = authenticate(&headers, "secret");
/// assert!(matches!(result, Err(AuthError::MissingCredentials)));
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Authentication context added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID; the owner for every scoped query
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
///
/// Every variant is an authentication failure; none of them reach a handler.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Authentication credentials were not provided")]
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject is unknown or inactive
    #[error("User not found or inactive")]
    InactiveUser,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Extracts the raw bearer token from request headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent or not valid UTF-8
/// - `AuthError::InvalidFormat` if the scheme is not `Bearer` or the token is empty
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    Ok(token)
}

/// Validates request headers and builds the caller's auth context
///
/// # Errors
///
/// Any [`AuthError`] from [`bearer_token`] or token validation.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)?;
    Ok(AuthContext::new(claims.sub))
}
