/// Recipe endpoints
///
/// Recipes are owner-scoped like tags and ingredients: every lookup passes the
/// caller's user ID, and a recipe owned by someone else is reported as 404.
///
/// # Endpoints
///
/// - `GET /v1/recipes` - List (`?tags=1,2&ingredients=3` to filter)
/// - `POST /v1/recipes` - Create, with nested `tags` / `ingredients` by name
/// - `GET /v1/recipes/:id` - Detail
/// - `PATCH /v1/recipes/:id` - Partial update; nested lists replace the sets
/// - `DELETE /v1/recipes/:id` - Delete

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{AppJson, AppPath, AppQuery},
    routes::attributes::AttributeResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::{
        attribute::AttributeKind,
        recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
    },
    store::RecordStore,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use validator::Validate;

/// Largest price magnitude that fits five digits with two decimal places
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 2);

/// Nested tag or ingredient in a request body
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeInput {
    pub name: String,
}

/// Recipe list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    /// Comma-separated tag IDs
    pub tags: Option<String>,

    /// Comma-separated ingredient IDs
    pub ingredients: Option<String>,
}

/// Create recipe request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(range(min = 0, message = "Time must not be negative"))]
    pub time_minutes: i32,

    pub price: Decimal,

    #[serde(default)]
    pub description: String,

    #[validate(length(max = 255, message = "Link must be at most 255 characters"))]
    pub link: Option<String>,

    #[serde(default)]
    pub tags: Vec<AttributeInput>,

    #[serde(default)]
    pub ingredients: Vec<AttributeInput>,
}

/// Partial recipe update
///
/// `link: null` clears the link; an absent `link` leaves it unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "Time must not be negative"))]
    pub time_minutes: Option<i32>,

    pub price: Option<Decimal>,

    pub description: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,

    pub tags: Option<Vec<AttributeInput>>,

    pub ingredients: Option<Vec<AttributeInput>>,
}

/// Marks a present field as `Some`, so an explicit `null` becomes `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Serialized recipe with its tags and ingredients
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: Option<String>,
    pub tags: Vec<AttributeResponse>,
    pub ingredients: Vec<AttributeResponse>,
}

impl RecipeResponse {
    async fn load(store: &dyn RecordStore, recipe: Recipe) -> ApiResult<Self> {
        let tags = store
            .recipe_attributes(AttributeKind::Tag, recipe.id, recipe.user_id)
            .await?;
        let ingredients = store
            .recipe_attributes(AttributeKind::Ingredient, recipe.id, recipe.user_id)
            .await?;

        Ok(Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            description: recipe.description,
            link: recipe.link,
            tags: tags.into_iter().map(AttributeResponse::from).collect(),
            ingredients: ingredients.into_iter().map(AttributeResponse::from).collect(),
        })
    }
}

fn parse_ids(field: &str, raw: Option<&str>) -> ApiResult<Vec<i64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ApiError::invalid(field, format!("'{}' is not a valid id", s)))
        })
        .collect()
}

fn check_price(price: Decimal) -> ApiResult<()> {
    if price.round_dp(2) != price {
        return Err(ApiError::invalid("price", "Price must have at most 2 decimal places"));
    }
    if price.abs() >= PRICE_LIMIT {
        return Err(ApiError::invalid("price", "Price must have at most 5 digits"));
    }
    Ok(())
}

fn check_names(field: &str, items: &[AttributeInput]) -> ApiResult<()> {
    if items.iter().any(|item| item.name.trim().is_empty()) {
        return Err(ApiError::invalid(field, "Name must not be blank"));
    }
    if items.iter().any(|item| item.name.chars().count() > 255) {
        return Err(ApiError::invalid(field, "Name must be at most 255 characters"));
    }
    Ok(())
}

fn names(items: Vec<AttributeInput>) -> Vec<String> {
    items.into_iter().map(|item| item.name).collect()
}

/// List the caller's recipes, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<ListRecipesQuery>,
) -> ApiResult<Json<Vec<RecipeResponse>>> {
    let filter = RecipeFilter {
        tags: parse_ids("tags", query.tags.as_deref())?,
        ingredients: parse_ids("ingredients", query.ingredients.as_deref())?,
    };

    let store = state.store.as_ref();
    let recipes = store.list_recipes(auth.user_id, &filter).await?;

    let mut out = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        out.push(RecipeResponse::load(store, recipe).await?);
    }

    Ok(Json(out))
}

/// Create a recipe
///
/// ```text
/// POST /v1/recipes
///
/// {
///   "title": "Thai Prawn Curry",
///   "time_minutes": 30,
///   "price": "2.50",
///   "tags": [{ "name": "Thai" }, { "name": "Dinner" }]
/// }
/// ```
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    req.validate()?;
    check_price(req.price)?;
    check_names("tags", &req.tags)?;
    check_names("ingredients", &req.ingredients)?;

    let store = state.store.as_ref();
    let recipe = store
        .create_recipe(
            auth.user_id,
            CreateRecipe {
                title: req.title,
                time_minutes: req.time_minutes,
                price: req.price,
                description: req.description,
                link: req.link,
                tags: names(req.tags),
                ingredients: names(req.ingredients),
            },
        )
        .await?;

    info!(recipe_id = recipe.id, user_id = %auth.user_id, "Created recipe");

    Ok((StatusCode::CREATED, Json(RecipeResponse::load(store, recipe).await?)))
}

/// Get one of the caller's recipes
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<RecipeResponse>> {
    let store = state.store.as_ref();
    let recipe = store
        .find_recipe(id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    Ok(Json(RecipeResponse::load(store, recipe).await?))
}

/// Partially update one of the caller's recipes
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    req.validate()?;
    if let Some(price) = req.price {
        check_price(price)?;
    }
    if let Some(Some(link)) = &req.link {
        if link.chars().count() > 255 {
            return Err(ApiError::invalid("link", "Link must be at most 255 characters"));
        }
    }
    if let Some(tags) = &req.tags {
        check_names("tags", tags)?;
    }
    if let Some(ingredients) = &req.ingredients {
        check_names("ingredients", ingredients)?;
    }

    let store = state.store.as_ref();
    let recipe = store
        .update_recipe(
            id,
            auth.user_id,
            UpdateRecipe {
                title: req.title,
                time_minutes: req.time_minutes,
                price: req.price,
                description: req.description,
                link: req.link,
                tags: req.tags.map(names),
                ingredients: req.ingredients.map(names),
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    info!(recipe_id = recipe.id, user_id = %auth.user_id, "Updated recipe");

    Ok(Json(RecipeResponse::load(store, recipe).await?))
}

/// Delete one of the caller's recipes
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_recipe(id, auth.user_id).await? {
        return Err(ApiError::NotFound("Recipe not found".to_string()));
    }

    info!(recipe_id = id, user_id = %auth.user_id, "Deleted recipe");
    Ok(StatusCode::NO_CONTENT)
}
