//! # Recipe API Server Library
//!
//! HTTP surface for the recipe service: users, recipes, and the owner-scoped
//! tag and ingredient endpoints.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors that reject with the API error body
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
