//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store so the HTTP surface can be
//! driven with `tower::ServiceExt::oneshot` without a database.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use recipe_api::app::{build_router, AppState};
use recipe_api::config::{ApiConfig, Config, JwtConfig, StoreBackend, StoreConfig};
use recipe_shared::auth::jwt::{create_token, Claims};
use recipe_shared::models::attribute::{Attribute, AttributeKind};
use recipe_shared::models::recipe::{CreateRecipe, Recipe};
use recipe_shared::models::user::{normalize_email, CreateUser, User};
use recipe_shared::store::memory::MemoryStore;
use recipe_shared::store::RecordStore;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing the app and one authenticated user
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub user: User,
    pub jwt_token: String,
}

/// A user with a token valid against the context's app
pub struct TestUser {
    pub user: User,
    pub jwt_token: String,
}

impl TestUser {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
            database_url: String::new(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
    }
}

impl TestContext {
    /// Creates a fresh store, router, and primary user
    pub async fn new() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), test_config()));
        let primary = insert_user(&store, "user@example.com").await?;

        Ok(TestContext {
            store,
            app,
            user: primary.user,
            jwt_token: primary.jwt_token,
        })
    }

    /// Adds another user with its own token
    pub async fn create_user(&self, email: &str) -> anyhow::Result<TestUser> {
        insert_user(&self.store, email).await
    }

    /// Returns authorization header value for the primary user
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    pub async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
        name: &str,
    ) -> anyhow::Result<Attribute> {
        Ok(self.store.create_attribute(kind, owner_id, name).await?)
    }

    pub async fn create_recipe(&self, owner_id: Uuid, title: &str) -> anyhow::Result<Recipe> {
        Ok(self
            .store
            .create_recipe(
                owner_id,
                CreateRecipe {
                    title: title.to_string(),
                    time_minutes: 10,
                    price: Decimal::new(500, 2),
                    description: String::new(),
                    link: None,
                    tags: Vec::new(),
                    ingredients: Vec::new(),
                },
            )
            .await?)
    }

    /// Sends one request through the router and returns status and JSON body
    ///
    /// An empty body is returned as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        self.dispatch(request).await
    }

    /// Authenticated request as the primary user with a verbatim body
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, self.auth_header());
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        self.dispatch(builder.body(Body::from(body.to_string()))?).await
    }

    /// A body that is not JSON comes back as `Value::String`
    async fn dispatch(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok((status, json))
    }

    /// Authenticated GET as the primary user
    pub async fn get(&self, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(&self.auth_header()), None).await
    }
}

/// Inserts a user directly (skipping password hashing) and signs a token
async fn insert_user(store: &MemoryStore, email: &str) -> anyhow::Result<TestUser> {
    let user = store
        .insert_user(CreateUser {
            email: normalize_email(email),
            password_hash: "test_hash".to_string(), // Not used in tests
            name: Some("Test User".to_string()),
            is_staff: false,
            is_superuser: false,
        })
        .await?;

    let jwt_token = create_token(&Claims::new(user.id), TEST_SECRET)?;
    Ok(TestUser { user, jwt_token })
}

/// Extracts the `name` field of each element of a JSON array
pub fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
