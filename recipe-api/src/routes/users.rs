/// User endpoints
///
/// # Endpoints
///
/// - `POST /v1/users` - Create an account (public)
/// - `GET /v1/users/me` - The authenticated user
///
/// Tokens are issued elsewhere; these endpoints never return one.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::AppJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::{middleware::AuthContext, password},
    models::user::User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked separately against the password policy
    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
}

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Create a new user
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "testpass123", "name": "Test Name" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is not JSON
/// - `422 Unprocessable Entity`: Invalid email, password too short, or a field of the wrong type
/// - `409 Conflict`: Email already exists
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;
    password::validate_password(&req.password).map_err(|e| ApiError::invalid("password", e))?;

    let user = User::create_user(state.store.as_ref(), &req.email, &req.password, req.name).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Returns the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
