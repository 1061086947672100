/// Tag and ingredient query engine
///
/// Sits between the HTTP collection endpoints and the record store. Every
/// operation takes the caller's user ID explicitly and passes it to the store,
/// which filters on it.
///
/// # Listing
///
/// ```text
/// list(kind, owner_id, options)
///   ├─> assigned_only = false: store.find_owned(kind, owner_id)
///   ├─> assigned_only = true:  store.find_owned_assigned(kind, owner_id)
///   ├─> drop repeated ids (first occurrence wins)
///   └─> stable sort by name, descending
/// ```
///
/// Rows with equal names keep the order the store returned them in, which is
/// insertion order for both store backends.
///
/// # Example
///
/// ```
/// use recipe_shared::models::attribute::AttributeKind;
/// use recipe_shared::query::{ListOptions, QueryEngine};
/// use recipe_shared::store::{memory::MemoryStore, RecordStore};
/// use std::sync::Arc;
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let owner = Uuid::new_v4();
/// for name in ["Vegan", "Dessert", "Drinks"] {
///     store.create_attribute(AttributeKind::Tag, owner, name).await?;
/// }
///
/// let engine = QueryEngine::new(store);
/// let tags = engine.list(AttributeKind::Tag, owner, ListOptions::default()).await?;
/// let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
/// assert_eq!(names, ["Vegan", "Drinks", "Dessert"]);
/// # Ok(())
/// # }
/// ```

use crate::models::attribute::{Attribute, AttributeKind, UpdateAttribute};
use crate::store::{RecordStore, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Error type for query engine operations
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Row absent or owned by someone else
    ///
    /// The two cases are deliberately indistinguishable.
    #[error("{0} not found")]
    NotFound(AttributeKind),

    /// Invalid input
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Record store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Options for [`QueryEngine::list`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only return rows referenced by at least one of the owner's recipes
    pub assigned_only: bool,
}

impl ListOptions {
    /// Builds options from the raw `assigned_only` query parameter
    ///
    /// Absent ⇒ false. Accepted spellings (case-insensitive, trimmed):
    ///
    /// - true: `1`, `true`, `yes`, `on`
    /// - false: `0`, `false`, `no`, `off`, empty string
    ///
    /// # Errors
    ///
    /// Any other value is `QueryError::Validation` on `assigned_only`.
    pub fn from_query(assigned_only: Option<&str>) -> Result<Self, QueryError> {
        let assigned_only = match assigned_only {
            None => false,
            Some(raw) => parse_flag(raw).ok_or_else(|| QueryError::Validation {
                field: "assigned_only",
                message: format!("Expected a boolean value, got '{}'", raw),
            })?,
        };

        Ok(Self { assigned_only })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Drops repeated ids (keeping the first) and sorts by name descending
///
/// `sort_by` is stable, so equal names keep their incoming order.
pub fn dedup_and_order(rows: Vec<Attribute>) -> Vec<Attribute> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut rows: Vec<Attribute> = rows.into_iter().filter(|row| seen.insert(row.id)).collect();
    rows.sort_by(|a, b| b.name.cmp(&a.name));
    rows
}

/// Owner-scoped list/update/delete over tags and ingredients
///
/// Holds no state besides the store handle; cloning is cheap.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn RecordStore>,
}

impl QueryEngine {
    /// Creates an engine over a record store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Lists the owner's attributes of `kind`
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Store` if the store fails.
    pub async fn list(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Attribute>, QueryError> {
        let rows = if options.assigned_only {
            self.store.find_owned_assigned(kind, owner_id).await?
        } else {
            self.store.find_owned(kind, owner_id).await?
        };

        let rows = dedup_and_order(rows);

        debug!(
            kind = %kind,
            owner_id = %owner_id,
            assigned_only = options.assigned_only,
            count = rows.len(),
            "Listed attributes"
        );

        Ok(rows)
    }

    /// Renames one of the owner's attributes
    ///
    /// # Errors
    ///
    /// - `QueryError::Validation` if the new name is blank
    /// - `QueryError::NotFound` if the row is absent or not owned by `owner_id`
    pub async fn update(
        &self,
        kind: AttributeKind,
        id: i64,
        owner_id: Uuid,
        data: UpdateAttribute,
    ) -> Result<Attribute, QueryError> {
        if let Some(name) = &data.name {
            if name.trim().is_empty() {
                return Err(QueryError::Validation {
                    field: "name",
                    message: "Name must not be blank".to_string(),
                });
            }
        }

        let row = self
            .store
            .update_owned(kind, id, owner_id, data)
            .await?
            .ok_or(QueryError::NotFound(kind))?;

        info!(kind = %kind, id, owner_id = %owner_id, "Updated attribute");
        Ok(row)
    }

    /// Deletes one of the owner's attributes and its recipe associations
    ///
    /// # Errors
    ///
    /// Returns `QueryError::NotFound` if the row is absent or not owned by `owner_id`.
    pub async fn delete(&self, kind: AttributeKind, id: i64, owner_id: Uuid) -> Result<(), QueryError> {
        if !self.store.delete_owned(kind, id, owner_id).await? {
            return Err(QueryError::NotFound(kind));
        }

        info!(kind = %kind, id, owner_id = %owner_id, "Deleted attribute");
        Ok(())
    }
}
