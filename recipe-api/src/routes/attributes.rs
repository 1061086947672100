/// Tag and ingredient endpoints
///
/// Both resources share one row shape and one set of handlers; each route
/// fixes the [`AttributeKind`] and delegates to the query engine with the
/// caller's user ID.
///
/// # Endpoints
///
/// - `GET /v1/tags`, `GET /v1/ingredients` - List (`?assigned_only=1` for in-use rows)
/// - `PATCH /v1/tags/:id`, `PATCH /v1/ingredients/:id` - Rename
/// - `DELETE /v1/tags/:id`, `DELETE /v1/ingredients/:id` - Delete

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::attribute::{Attribute, AttributeKind, UpdateAttribute},
    query::ListOptions,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Serialized tag or ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeResponse {
    pub id: i64,
    pub name: String,
}

impl From<Attribute> for AttributeResponse {
    fn from(row: Attribute) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// List query parameters
///
/// `assigned_only` is kept raw so malformed values surface as a field error
/// rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListAttributesQuery {
    pub assigned_only: Option<String>,
}

/// Rename request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttributeRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
}

async fn list(
    kind: AttributeKind,
    state: AppState,
    auth: AuthContext,
    query: ListAttributesQuery,
) -> ApiResult<Json<Vec<AttributeResponse>>> {
    let options = ListOptions::from_query(query.assigned_only.as_deref())?;
    let rows = state.engine.list(kind, auth.user_id, options).await?;

    Ok(Json(rows.into_iter().map(AttributeResponse::from).collect()))
}

async fn update(
    kind: AttributeKind,
    state: AppState,
    auth: AuthContext,
    id: i64,
    req: UpdateAttributeRequest,
) -> ApiResult<Json<AttributeResponse>> {
    req.validate()?;

    let row = state
        .engine
        .update(kind, id, auth.user_id, UpdateAttribute { name: req.name })
        .await?;

    Ok(Json(row.into()))
}

async fn delete(
    kind: AttributeKind,
    state: AppState,
    auth: AuthContext,
    id: i64,
) -> ApiResult<StatusCode> {
    state.engine.delete(kind, id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /v1/tags`
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<ListAttributesQuery>,
) -> ApiResult<Json<Vec<AttributeResponse>>> {
    list(AttributeKind::Tag, state, auth, query).await
}

/// `PATCH /v1/tags/:id`
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateAttributeRequest>,
) -> ApiResult<Json<AttributeResponse>> {
    update(AttributeKind::Tag, state, auth, id, req).await
}

/// `DELETE /v1/tags/:id`
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<StatusCode> {
    delete(AttributeKind::Tag, state, auth, id).await
}

/// `GET /v1/ingredients`
pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<ListAttributesQuery>,
) -> ApiResult<Json<Vec<AttributeResponse>>> {
    list(AttributeKind::Ingredient, state, auth, query).await
}

/// `PATCH /v1/ingredients/:id`
pub async fn update_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateAttributeRequest>,
) -> ApiResult<Json<AttributeResponse>> {
    update(AttributeKind::Ingredient, state, auth, id, req).await
}

/// `DELETE /v1/ingredients/:id`
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<StatusCode> {
    delete(AttributeKind::Ingredient, state, auth, id).await
}
