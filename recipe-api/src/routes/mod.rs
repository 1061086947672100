/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Account creation and the current user
/// - `attributes`: Tag and ingredient listing, renaming, and deletion
/// - `recipes`: Recipe CRUD with nested tags and ingredients

pub mod attributes;
pub mod health;
pub mod recipes;
pub mod users;
