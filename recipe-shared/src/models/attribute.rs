/// Recipe attributes: tags and ingredients
///
/// Tags and ingredients have the same shape and the same rules. Each row is
/// owned by exactly one user and can be associated with any number of that
/// user's recipes. A single row type, [`Attribute`], represents both kinds;
/// [`AttributeKind`] selects the table and association table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL
/// );
///
/// CREATE TABLE recipe_tags (
///     recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
///     tag_id BIGINT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
///     PRIMARY KEY (recipe_id, tag_id)
/// );
/// ```
///
/// `ingredients` and `recipe_ingredients` are identical with `ingredient_id`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which attribute table a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Free-form label such as "Vegan" or "Dessert"
    Tag,

    /// Ingredient such as "Apples" or "Turkey"
    Ingredient,
}

impl AttributeKind {
    /// Table holding rows of this kind
    pub fn table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }

    /// Association table linking recipes to rows of this kind
    pub fn join_table(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "recipe_tags",
            AttributeKind::Ingredient => "recipe_ingredients",
        }
    }

    /// Column of the association table referencing this kind
    pub fn join_column(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag_id",
            AttributeKind::Ingredient => "ingredient_id",
        }
    }

    /// Singular name, used in log fields and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tag",
            AttributeKind::Ingredient => "ingredient",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag or ingredient row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attribute {
    /// Row ID, assigned in insertion order
    pub id: i64,

    /// Owning user
    pub user_id: Uuid,

    /// Display name (not unique per user)
    pub name: String,
}

/// Input for renaming an attribute
///
/// Only non-None fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAttribute {
    /// New name
    pub name: Option<String>,
}
