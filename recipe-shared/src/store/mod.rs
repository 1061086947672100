/// Owner-scoped record store
///
/// Every query against recipes, tags, and ingredients takes the owning user's
/// ID as a mandatory argument. There is no unscoped variant: a row that
/// belongs to another user behaves exactly like a row that does not exist.
///
/// # Backends
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: in-process tables behind a `RwLock` (tests, local runs)
///
/// Both backends implement the same semantics:
///
/// - `find_owned` returns rows in insertion order
/// - `find_owned_assigned` returns each row at most once, even when several
///   recipes reference it
/// - single-row updates and deletes are atomic
/// - a recipe write and its association sets commit together
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::attribute::AttributeKind;
/// use recipe_shared::store::{memory::MemoryStore, RecordStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let owner = Uuid::new_v4();
///
/// store.create_attribute(AttributeKind::Tag, owner, "Vegan").await?;
/// let tags = store.find_owned(AttributeKind::Tag, owner).await?;
/// assert_eq!(tags.len(), 1);
/// # Ok(())
/// # }
/// ```

use crate::models::{
    attribute::{Attribute, AttributeKind, UpdateAttribute},
    recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Error type for record store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Row absent or not owned by the caller
    #[error("Record not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    let constraint = db_err.constraint().unwrap_or("unique").to_string();
                    return StoreError::Conflict(constraint);
                }
                StoreError::Database(db_err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence interface for users, recipes, and recipe attributes
///
/// Methods touching owned rows take `owner_id` explicitly. Implementations
/// must apply it as a filter on every such query.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; duplicate email is `StoreError::Conflict`
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Creates a tag or ingredient owned by `owner_id`
    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
        name: &str,
    ) -> StoreResult<Attribute>;

    /// All attributes of `kind` owned by `owner_id`, in insertion order
    async fn find_owned(&self, kind: AttributeKind, owner_id: Uuid) -> StoreResult<Vec<Attribute>>;

    /// Attributes of `kind` owned by `owner_id` referenced by at least one of
    /// the owner's recipes, each returned once, in insertion order
    async fn find_owned_assigned(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>>;

    /// Applies `data` to one owned attribute; None if absent or not owned
    async fn update_owned(
        &self,
        kind: AttributeKind,
        id: i64,
        owner_id: Uuid,
        data: UpdateAttribute,
    ) -> StoreResult<Option<Attribute>>;

    /// Deletes one owned attribute and its association rows; false if absent or not owned
    async fn delete_owned(&self, kind: AttributeKind, id: i64, owner_id: Uuid) -> StoreResult<bool>;

    /// Inserts a recipe together with its tag and ingredient sets
    ///
    /// Each name resolves to the owner's oldest attribute with that exact
    /// name, or a new one. Nothing is written unless everything is.
    async fn create_recipe(&self, owner_id: Uuid, data: CreateRecipe) -> StoreResult<Recipe>;

    /// Owner's recipes, newest first, restricted by `filter`
    async fn list_recipes(&self, owner_id: Uuid, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>>;

    async fn find_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<Option<Recipe>>;

    /// Applies `data` to one owned recipe; None if absent or not owned
    ///
    /// A `Some` tag or ingredient list replaces that association set, with
    /// names resolved as in [`RecordStore::create_recipe`]. The row and the
    /// sets change together or not at all.
    async fn update_recipe(
        &self,
        id: i64,
        owner_id: Uuid,
        data: UpdateRecipe,
    ) -> StoreResult<Option<Recipe>>;

    /// Deletes one owned recipe and its association rows; false if absent or not owned
    async fn delete_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<bool>;

    /// Adds an attribute to a recipe's association set
    ///
    /// Both rows must belong to `owner_id`, otherwise `StoreError::NotFound`.
    /// Adding an existing association is a no-op.
    async fn assign(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        attribute_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<()>;

    /// Attributes in a recipe's association set, in insertion order
    async fn recipe_attributes(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>>;
}
