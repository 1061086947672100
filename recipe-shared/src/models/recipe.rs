/// Recipe model
///
/// A recipe is owned by exactly one user and holds two association sets:
/// the tags and the ingredients it references. Creating or updating a recipe
/// can name the attributes to link; the store resolves each name to the
/// owner's existing row (or creates one) and writes the recipe and its
/// association sets together.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     time_minutes INTEGER NOT NULL,
///     price NUMERIC(5, 2) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     link VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Row ID, assigned in insertion order
    pub id: i64,

    /// Owning user
    pub user_id: Uuid,

    /// Recipe title
    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price with two decimal places
    pub price: Decimal,

    /// Free-text description (may be empty)
    pub description: String,

    /// Optional external link
    pub link: Option<String>,

    /// When the recipe was created
    pub created_at: DateTime<Utc>,

    /// When the recipe was last updated
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Input for creating a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: String,
    pub link: Option<String>,

    /// Tag names to link
    #[serde(default)]
    pub tags: Vec<String>,

    /// Ingredient names to link
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// Input for updating a recipe
///
/// Only non-None fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,

    /// New link (use Some(None) to clear)
    pub link: Option<Option<String>>,

    /// Replacement tag set by name; None keeps the current set
    pub tags: Option<Vec<String>>,

    pub ingredients: Option<Vec<String>>,
}

/// Restricts a recipe listing to recipes referencing any of the given ids
///
/// An empty list means "no restriction" for that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}
