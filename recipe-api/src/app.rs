/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use recipe_api::{app::{build_router, AppState}, config::Config};
/// use recipe_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use recipe_shared::{
    auth::middleware::{authenticate, AuthError},
    query::QueryEngine,
    store::RecordStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, Level};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Record store backing every handler
    pub store: Arc<dyn RecordStore>,

    /// Tag/ingredient query engine over `store`
    pub engine: QueryEngine,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            engine: QueryEngine::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret used to validate bearer tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── POST   /users             # Create account (public)
///     ├── GET    /users/me          # Current user
///     ├── GET    /tags              # ?assigned_only=
///     ├── PATCH  /tags/:id
///     ├── DELETE /tags/:id
///     ├── GET    /ingredients       # ?assigned_only=
///     ├── PATCH  /ingredients/:id
///     ├── DELETE /ingredients/:id
///     ├── GET    /recipes           # ?tags=1,2&ingredients=3
///     ├── POST   /recipes
///     ├── GET    /recipes/:id
///     ├── PATCH  /recipes/:id
///     └── DELETE /recipes/:id
/// ```
///
/// Everything under `/v1` except `POST /users` sits behind [`jwt_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_routes = Router::new().route("/users", post(routes::users::create_user));

    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route("/tags", get(routes::attributes::list_tags))
        .route(
            "/tags/:id",
            axum::routing::patch(routes::attributes::update_tag)
                .delete(routes::attributes::delete_tag),
        )
        .route("/ingredients", get(routes::attributes::list_ingredients))
        .route(
            "/ingredients/:id",
            axum::routing::patch(routes::attributes::update_ingredient)
                .delete(routes::attributes::delete_ingredient),
        )
        .route(
            "/recipes",
            get(routes::recipes::list_recipes).post(routes::recipes::create_recipe),
        )
        .route(
            "/recipes/:id",
            get(routes::recipes::get_recipe)
                .patch(routes::recipes::update_recipe)
                .delete(routes::recipes::delete_recipe),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token, confirms the subject is an active user, then
/// injects `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    let active = state
        .store
        .find_user_by_id(auth_context.user_id)
        .await?
        .is_some_and(|user| user.is_active);
    if !active {
        debug!(user_id = %auth_context.user_id, "Rejected token for unknown or inactive user");
        return Err(AuthError::InactiveUser.into());
    }

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
