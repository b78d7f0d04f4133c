// Preserve Explorer - land-trust preserve store, public read API and map explorer client

// Core types and primitives
pub mod core;

// Preserve domain model
pub mod models;

// Infrastructure - storage backends, caching, viewer context and middleware
pub mod infrastructure;

// Services - the preserve store
pub mod services;

// HTTP API - public reads and the admin bridge
pub mod api;

// Map explorer client
pub mod client;

// Common utilities
pub mod app_state;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
