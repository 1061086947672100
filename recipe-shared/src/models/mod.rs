/// Domain models for the recipe service
///
/// This module contains the row types stored by the record store and the
/// input structs used to create and update them.
///
/// # Models
///
/// - `user`: User accounts, email normalization, and the creation factory
/// - `recipe`: Recipes owned by a user
/// - `attribute`: Tags and ingredients, the two kinds of recipe attributes
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::user::User;
/// use recipe_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = User::create_user(&store, "cook@Example.COM", "Sup3r$ecret", None).await?;
/// assert_eq!(user.email, "cook@example.com");
/// # Ok(())
/// # }
/// ```

pub mod attribute;
pub mod recipe;
pub mod user;
