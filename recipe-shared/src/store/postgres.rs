/// PostgreSQL record store
///
/// Implements [`RecordStore`] with sqlx runtime queries against the schema in
/// `migrations/`. Table names are chosen by [`AttributeKind`], never by caller
/// input, so interpolating them into SQL is safe.
///
/// # Assigned-only Query
///
/// The "assigned" set is computed with a semi-join, so the database returns
/// each attribute once no matter how many recipes reference it:
///
/// ```sql
/// SELECT id, user_id, name FROM tags
/// WHERE user_id = $1
///   AND id IN (
///       SELECT rt.tag_id FROM recipe_tags rt
///       JOIN recipes r ON r.id = rt.recipe_id
///       WHERE r.user_id = $1
///   )
/// ORDER BY id
/// ```
///
/// # Example
///
/// ```no_run
/// use recipe_shared::db::pool::{create_pool, DatabaseConfig};
/// use recipe_shared::store::postgres::PgStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// # Ok(())
/// # }
/// ```

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{
    attribute::{Attribute, AttributeKind, UpdateAttribute},
    recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, password_hash, name, is_active, is_staff, is_superuser, created_at, updated_at";

const RECIPE_COLUMNS: &str =
    "id, user_id, title, time_minutes, price, description, link, created_at, updated_at";

/// Record store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Replaces a recipe's association set of `kind` with the named attributes
///
/// Runs on the caller's connection so it joins the caller's transaction. The
/// recipe must already be known to belong to `owner_id`.
async fn replace_assignments(
    conn: &mut PgConnection,
    kind: AttributeKind,
    recipe_id: i64,
    owner_id: Uuid,
    names: &[String],
) -> StoreResult<()> {
    let clear = format!("DELETE FROM {} WHERE recipe_id = $1", kind.join_table());
    sqlx::query(&clear).bind(recipe_id).execute(&mut *conn).await?;

    let find = format!(
        "SELECT id, user_id, name FROM {} WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
        kind.table()
    );
    let create = format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
        kind.table()
    );
    let link = format!(
        "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.join_table(),
        kind.join_column()
    );

    for name in names {
        let existing = sqlx::query_as::<_, Attribute>(&find)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        let row = match existing {
            Some(row) => row,
            None => {
                sqlx::query_as::<_, Attribute>(&create)
                    .bind(owner_id)
                    .bind(name)
                    .fetch_one(&mut *conn)
                    .await?
            }
        };

        sqlx::query(&link)
            .bind(recipe_id)
            .bind(row.id)
            .execute(&mut *conn)
            .await?;
    }

    debug!(recipe_id, kind = %kind, count = names.len(), "Replaced associations");
    Ok(())
}

#[async_trait]
impl RecordStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (email, password_hash, name, is_staff, is_superuser)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.name)
            .bind(data.is_staff)
            .bind(data.is_superuser)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_attribute(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
        name: &str,
    ) -> StoreResult<Attribute> {
        let query = format!(
            "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
            kind.table()
        );

        let row = sqlx::query_as::<_, Attribute>(&query)
            .bind(owner_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_owned(&self, kind: AttributeKind, owner_id: Uuid) -> StoreResult<Vec<Attribute>> {
        let query = format!(
            "SELECT id, user_id, name FROM {} WHERE user_id = $1 ORDER BY id",
            kind.table()
        );

        let rows = sqlx::query_as::<_, Attribute>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_owned_assigned(
        &self,
        kind: AttributeKind,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>> {
        let query = format!(
            r#"
            SELECT id, user_id, name FROM {table}
            WHERE user_id = $1
              AND id IN (
                  SELECT j.{column} FROM {join} j
                  JOIN recipes r ON r.id = j.recipe_id
                  WHERE r.user_id = $1
              )
            ORDER BY id
            "#,
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        );

        let rows = sqlx::query_as::<_, Attribute>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update_owned(
        &self,
        kind: AttributeKind,
        id: i64,
        owner_id: Uuid,
        data: UpdateAttribute,
    ) -> StoreResult<Option<Attribute>> {
        let query = format!(
            r#"
            UPDATE {}
            SET name = COALESCE($3, name)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name
            "#,
            kind.table()
        );

        let row = sqlx::query_as::<_, Attribute>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(data.name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete_owned(&self, kind: AttributeKind, id: i64, owner_id: Uuid) -> StoreResult<bool> {
        // Association rows go with ON DELETE CASCADE
        let query = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table());

        let result = sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_recipe(&self, owner_id: Uuid, data: CreateRecipe) -> StoreResult<Recipe> {
        let query = format!(
            "INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RECIPE_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&query)
            .bind(owner_id)
            .bind(data.title)
            .bind(data.time_minutes)
            .bind(data.price)
            .bind(data.description)
            .bind(data.link)
            .fetch_one(&mut *tx)
            .await?;

        replace_assignments(&mut tx, AttributeKind::Tag, recipe.id, owner_id, &data.tags).await?;
        replace_assignments(&mut tx, AttributeKind::Ingredient, recipe.id, owner_id, &data.ingredients)
            .await?;

        tx.commit().await?;
        Ok(recipe)
    }

    async fn list_recipes(&self, owner_id: Uuid, filter: &RecipeFilter) -> StoreResult<Vec<Recipe>> {
        let mut query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = $1");
        let mut bind_count = 1;

        if !filter.tags.is_empty() {
            bind_count += 1;
            query.push_str(&format!(
                " AND id IN (SELECT recipe_id FROM recipe_tags WHERE tag_id = ANY(${}))",
                bind_count
            ));
        }
        if !filter.ingredients.is_empty() {
            bind_count += 1;
            query.push_str(&format!(
                " AND id IN (SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id = ANY(${}))",
                bind_count
            ));
        }
        query.push_str(" ORDER BY id DESC");

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(owner_id);
        if !filter.tags.is_empty() {
            q = q.bind(filter.tags.clone());
        }
        if !filter.ingredients.is_empty() {
            q = q.bind(filter.ingredients.clone());
        }

        let recipes = q.fetch_all(&self.pool).await?;
        Ok(recipes)
    }

    async fn find_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<Option<Recipe>> {
        let query = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2");

        let recipe = sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        id: i64,
        owner_id: Uuid,
        data: UpdateRecipe,
    ) -> StoreResult<Option<Recipe>> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE recipes SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.time_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", time_minutes = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.link.is_some() {
            bind_count += 1;
            query.push_str(&format!(", link = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {RECIPE_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(id).bind(owner_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(time_minutes) = data.time_minutes {
            q = q.bind(time_minutes);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(link) = data.link {
            q = q.bind(link);
        }

        let mut tx = self.pool.begin().await?;

        // Dropping the transaction on an early return rolls it back
        let Some(recipe) = q.fetch_optional(&mut *tx).await? else {
            return Ok(None);
        };

        for (kind, names) in [
            (AttributeKind::Tag, data.tags),
            (AttributeKind::Ingredient, data.ingredients),
        ] {
            if let Some(names) = names {
                replace_assignments(&mut tx, kind, recipe.id, owner_id, &names).await?;
            }
        }

        tx.commit().await?;
        Ok(Some(recipe))
    }

    async fn delete_recipe(&self, id: i64, owner_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn assign(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        attribute_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<()> {
        let query = format!(
            r#"
            INSERT INTO {join} (recipe_id, {column})
            SELECT r.id, a.id
            FROM recipes r, {table} a
            WHERE r.id = $1 AND a.id = $2 AND r.user_id = $3 AND a.user_id = $3
            ON CONFLICT DO NOTHING
            RETURNING recipe_id
            "#,
            join = kind.join_table(),
            column = kind.join_column(),
            table = kind.table(),
        );

        let inserted = sqlx::query(&query)
            .bind(recipe_id)
            .bind(attribute_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        if inserted.is_some() {
            return Ok(());
        }

        // Nothing inserted: either the pair already exists or a row is not owned
        let exists_query = format!(
            "SELECT EXISTS (SELECT 1 FROM {join} j JOIN recipes r ON r.id = j.recipe_id
             WHERE j.recipe_id = $1 AND j.{column} = $2 AND r.user_id = $3)",
            join = kind.join_table(),
            column = kind.join_column(),
        );

        let exists: bool = sqlx::query_scalar(&exists_query)
            .bind(recipe_id)
            .bind(attribute_id)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            debug!(recipe_id, attribute_id, kind = %kind, "Association already present");
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn recipe_attributes(
        &self,
        kind: AttributeKind,
        recipe_id: i64,
        owner_id: Uuid,
    ) -> StoreResult<Vec<Attribute>> {
        if self.find_recipe(recipe_id, owner_id).await?.is_none() {
            return Err(StoreError::NotFound);
        }

        let query = format!(
            r#"
            SELECT a.id, a.user_id, a.name FROM {table} a
            JOIN {join} j ON j.{column} = a.id
            WHERE j.recipe_id = $1 AND a.user_id = $2
            ORDER BY a.id
            "#,
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        );

        let rows = sqlx::query_as::<_, Attribute>(&query)
            .bind(recipe_id)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
