//! # Recipe Shared Library
//!
//! This crate contains the domain types, storage layer, and business logic used
//! by the recipe API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, recipes, and recipe attributes (tags and ingredients)
//! - `store`: Owner-scoped record store trait with PostgreSQL and in-memory backends
//! - `query`: Tag/ingredient listing engine (assigned-only filtering, ordering)
//! - `auth`: Password hashing, token validation, and request authentication
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod query;
pub mod store;

/// Current version of the recipe shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
