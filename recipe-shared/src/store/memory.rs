/// In-memory record store
///
/// Keeps every table in process memory behind a single `tokio::sync::RwLock`.
/// Reads take the read lock, mutations take the write lock, so each
/// operation is atomic with respect to the others.
///
/// Row IDs come from per-table sequences starting at 1, and tables are
/// `BTreeMap`s keyed by ID, so iteration order is insertion order, the same
/// order PostgreSQL's `BIGSERIAL` produces.
///
/// # Example
///
/// ```
/// use recipe_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new());
/// ```

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{
    attribute::{Attribute, AttributeKind, UpdateAttribute},
    recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    recipes: BTreeMap<i64, Recipe>,
    attributes: HashMap<AttributeKind, BTreeMap<i64, Attribute>>,
    /// (recipe_id, attribute_id) pairs per kind
    assignments: HashMap<AttributeKind, BTreeSet<(i64, i64)>>,
    recipe_seq: i64,
    attribute_seq: HashMap<AttributeKind, i64>,
}

impl Tables {
    fn attributes(&self, kind: AttributeKind) -> impl Iterator<Item = &Attribute> {
        self.attributes.get(&kind).into_iter().flat_map(|rows| rows.values())
    }

    fn owned_attribute(&self, kind: AttributeKind, id: i64, owner_id: Uuid) -> Option<&Attribute> {
        self.attributes
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .filter(|row| row.user_id == owner_id)
    }

    fn owned_recipe(&self, id: i64, owner_id: Uuid) -> Option<&Recipe> {
        self.recipes.get(&id).filter(|row| row.user_id == owner_id)
    }

    fn assigned_pairs(&self, kind: AttributeKind) -> impl Iterator<Item = &(i64, i64)> {
        self.assignments.get(&kind).into_iter().flat_map(|pairs| pairs.iter())
    }

    fn insert_attribute(&mut self, kind: AttributeKind, owner_id: Uuid, name: &str) -> Attribute {
        let seq = self.attribute_seq.entry(kind).or_insert(0);
        *seq += 1;

        let row = Attribute {
            id: *seq,
            user_id: owner_id,
            name: name.to_string(),
        };
        self.attributes
            .entry(kind)
            .or_default()
            .insert(row.id, row.clone());
        row
    }

    /// Empties one association set of a recipe and refills it by name
    ///
    /// Each name resolves to the owner's oldest attribute with that name, or a
    /// new row. The caller holds the write lock and has checked ownership.
    fn replace_assignments(
        &mut self,
        kind: AttributeKind,
        recipe_id: i64,
        owner_id: Uuid,
        names: &[String],
    ) {
        let mut pairs = BTreeSet::new();
        for name in names {
            let existing = self
                .attributes(kind)
                .find(|row| row.user_id == owner_id && &row.name == name)
                .map(|row| row.id);
            let attribute_id = match existing {
                Some(id) => id,
                None => self.insert_attribute(kind, owner_id, name).id,
            };
            pairs.insert((recipe_id, attribute_id));
        }

        let set = self.assignments.entry(kind).or_default();
        set.retain(|(r, _)| *r != recipe_id);
        set.extend(pairs);
    }
}

/// Record store keeping all rows in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            name: data.name,
            is_active: true,
            is_staff: data.is_staff,
            is_superuser: data.is_superuser,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
        name: &str,
    ) -> StoreResult<Attribute> {
        let mut tables = self.tables.write().await;
        Ok(tables.insert_attribute(kind, owner_id, name))
    }

    async fn find_owned(&self, kind: AttributeKind, owner_id: Uuid) -> StoreResult<Vec<Attribute>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attributes(kind)
            .filter(|row| row.user_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_owned_assigned(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>> {
        let tables = self.tables.read().await;

        let assigned: BTreeSet<i64> = tables
            .assigned_pairs(kind)
            .filter(|(recipe_id, _)| tables.owned_recipe(*recipe_id, owner_id).is_some())
            .map(|(_, attribute_id)| *attribute_id)
            .collect();

        Ok(tables
            .attributes(kind)
            .filter(|row| row.user_id == owner_id && assigned.contains(&row.id))
            .cloned()
            .collect())
    }

    async fn update_owned(
        &self,
        kind: AttributeKind,
        id: i64,
        owner_id: Uuid,
        data: UpdateAttribute,
    ) -> StoreResult<Option<Attribute>> {
        let mut tables = self.tables.write().await;

        let row = tables
            .attributes
            .get_mut(&kind)
            .and_then(|rows| rows.get_mut(&id))
            .filter(|row| row.user_id == owner_id);

        Ok(row.map(|row| {
            if let Some(name) = data.name {
                row.name = name;
            }
            row.clone()
        }))
    }

    async fn delete_owned(&self, kind: AttributeKind, id: i64, owner_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.owned_attribute(kind, id, owner_id).is_none() {
            return Ok(false);
        }

        if let Some(rows) = tables.attributes.get_mut(&kind) {
            rows.remove(&id);
        }
        if let Some(pairs) = tables.assignments.get_mut(&kind) {
            pairs.retain(|(_, attribute_id)| *attribute_id != id);
        }
        Ok(true)
    }

    async fn create_recipe(&self, owner_id: Uuid, data: CreateRecipe) -> StoreResult<Recipe> {
        let mut tables = self.tables.write().await;
        tables.recipe_seq += 1;

        let now = Utc::now();
        let recipe = Recipe {
            id: tables.recipe_seq,
            user_id: owner_id,
            title: data.title,
            time_minutes: data.time_minutes,
            price: data.price,
            description: data.description,
            link: data.link,
            created_at: now,
            updated_at: now,
        };
        tables.recipes.insert(recipe.id, recipe.clone());
        tables.replace_assignments(AttributeKind::Tag, recipe.id, owner_id, &data.tags);
        tables.replace_assignments(AttributeKind::Ingredient, recipe.id, owner_id, &data.ingredients);
        Ok(recipe)
    }

    async fn list_recipes(&self, owner_id: Uuid, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let tables = self.tables.read().await;

        let references_any = |kind: AttributeKind, recipe_id: i64, ids: &[i64]| {
            ids.is_empty()
                || tables
                    .assigned_pairs(kind)
                    .any(|(r, a)| *r == recipe_id && ids.contains(a))
        };

        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|r| r.user_id == owner_id)
            .filter(|r| references_any(AttributeKind::Tag, r.id, &filter.tags))
            .filter(|r| references_any(AttributeKind::Ingredient, r.id, &filter.ingredients))
            .cloned()
            .collect())
    }

    async fn find_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<Option<Recipe>> {
        Ok(self.tables.read().await.owned_recipe(id, owner_id).cloned())
    }

    async fn update_recipe(
        &self,
        id: i64,
        owner_id: Uuid,
        data: UpdateRecipe,
    ) -> StoreResult<Option<Recipe>> {
        let mut tables = self.tables.write().await;

        let Some(recipe) = tables.recipes.get_mut(&id).filter(|r| r.user_id == owner_id) else {
            return Ok(None);
        };

        if let Some(title) = data.title {
            recipe.title = title;
        }
        if let Some(time_minutes) = data.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = data.price {
            recipe.price = price;
        }
        if let Some(description) = data.description {
            recipe.description = description;
        }
        if let Some(link) = data.link {
            recipe.link = link;
        }
        recipe.updated_at = Utc::now();
        let recipe = recipe.clone();

        if let Some(names) = data.tags {
            tables.replace_assignments(AttributeKind::Tag, id, owner_id, &names);
        }
        if let Some(names) = data.ingredients {
            tables.replace_assignments(AttributeKind::Ingredient, id, owner_id, &names);
        }
        Ok(Some(recipe))
    }

    async fn delete_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if tables.owned_recipe(id, owner_id).is_none() {
            return Ok(false);
        }

        tables.recipes.remove(&id);
        for pairs in tables.assignments.values_mut() {
            pairs.retain(|(recipe_id, _)| *recipe_id != id);
        }
        Ok(true)
    }

    async fn assign(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        attribute_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        if tables.owned_recipe(recipe_id, owner_id).is_none()
            || tables.owned_attribute(kind, attribute_id, owner_id).is_none()
        {
            return Err(StoreError::NotFound);
        }

        tables
            .assignments
            .entry(kind)
            .or_default()
            .insert((recipe_id, attribute_id));
        Ok(())
    }

    async fn recipe_attributes(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>> {
        let tables = self.tables.read().await;

        if tables.owned_recipe(recipe_id, owner_id).is_none() {
            return Err(StoreError::NotFound);
        }

        let ids: BTreeSet<i64> = tables
            .assigned_pairs(kind)
            .filter(|(r, _)| *r == recipe_id)
            .map(|(_, a)| *a)
            .collect();

        Ok(tables
            .attributes(kind)
            .filter(|row| ids.contains(&row.id))
            .cloned()
            .collect())
    }
}
