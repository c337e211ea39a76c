//! HTTP handlers for products, categories, and token authentication.

pub mod auth;
pub mod categories;
pub mod products;
