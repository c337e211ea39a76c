//! Storefront API: product and category catalog REST backend.

pub mod auth;
pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::{AppConfig, StoreKind};
pub use error::{AppError, ConfigError, FieldErrors};
pub use models::{Category, NewCategory, NewProduct, Price, Product, User};
pub use query::ProductQuery;
pub use routes::{api_routes, build_app, common_routes};
pub use service::CatalogService;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
