/// User model and account factory
///
/// This module provides the User model and the factory used to create user
/// accounts. Recipes, tags, and ingredients are all owned by a user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Email Normalization
///
/// The domain part of an email is lower-cased when the account is created.
/// The local part is kept verbatim, so `Test2@Example.com` is stored as
/// `Test2@example.com`.
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::user::User;
/// use recipe_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
///
/// let user = User::create_user(&store, "Test2@Example.com", "sample123", None).await?;
/// assert_eq!(user.email, "Test2@example.com");
/// assert!(user.check_password("sample123"));
/// # Ok(())
/// # }
/// ```

use crate::auth::password::{self, PasswordError};
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address with a lower-cased domain
    ///
    /// Must be unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Whether the user can access staff tooling
    pub is_staff: bool,

    /// Whether the user has every permission
    pub is_superuser: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user row
///
/// `email` must already be normalized and `password_hash` must be a hash.
/// Use [`User::create_user`] rather than building this directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,

    /// Staff flag
    pub is_staff: bool,

    /// Superuser flag
    pub is_superuser: bool,
}

/// Error type for account creation
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// A required field was empty or malformed
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Record store failure (including duplicate email)
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Normalizes an email address
///
/// Trims surrounding whitespace and lower-cases the domain. The local part
/// is preserved as given. Addresses without `@` are returned trimmed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

impl User {
    /// Creates a regular user account
    ///
    /// # Errors
    ///
    /// - `UserError::Validation` if the email is empty
    /// - `UserError::Password` if hashing fails
    /// - `UserError::Store` if the email already exists or the store fails
    pub async fn create_user(
        store: &dyn RecordStore,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<Self, UserError> {
        Self::create_with_flags(store, email, password, name, false).await
    }

    /// Creates a superuser account (`is_staff` and `is_superuser` set)
    ///
    /// # Errors
    ///
    /// Same as [`User::create_user`].
    pub async fn create_superuser(
        store: &dyn RecordStore,
        email: &str,
        password: &str,
    ) -> Result<Self, UserError> {
        Self::create_with_flags(store, email, password, None, true).await
    }

    async fn create_with_flags(
        store: &dyn RecordStore,
        email: &str,
        password: &str,
        name: Option<String>,
        elevated: bool,
    ) -> Result<Self, UserError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(UserError::Validation {
                field: "email",
                message: "User must have an email address".to_string(),
            });
        }

        let password_hash = password::hash_password_blocking(password.to_string()).await?;

        let user = store
            .insert_user(CreateUser {
                email,
                password_hash,
                name,
                is_staff: elevated,
                is_superuser: elevated,
            })
            .await?;

        info!(user_id = %user.id, superuser = elevated, "Created user");
        Ok(user)
    }

    /// Checks a plaintext password against the stored hash
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn check_password(&self, password: &str) -> bool {
        password::verify_password(password, &self.password_hash).unwrap_or(false)
    }
}
