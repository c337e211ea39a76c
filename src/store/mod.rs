//! Persistence seam: catalog and account storage behind one trait.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::models::{AuthToken, Category, NewCategory, NewProduct, Product, User};
use crate::query::ProductQuery;
use async_trait::async_trait;

/// Storage operations the catalog needs. Implementations own id generation and `created_date`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness check used by `/ready`.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn get_category(&self, id: i64) -> Result<Option<Category>, AppError>;
    async fn create_category(&self, input: &NewCategory) -> Result<Category, AppError>;

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError>;
    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError>;
    /// Fails with a `category_id` validation error when the category does not exist.
    async fn create_product(&self, input: &NewProduct) -> Result<Product, AppError>;
    /// `None` when no product has this id.
    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError>;
    /// `false` when no product has this id.
    async fn delete_product(&self, id: i64) -> Result<bool, AppError>;

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Store `key` for the user, or return the token the user already has.
    async fn issue_token(&self, user_id: i64, key: &str) -> Result<AuthToken, AppError>;
    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError>;
    async fn revoke_token(&self, key: &str) -> Result<bool, AppError>;
}

/// Field error used when a product points at a missing category.
pub(crate) fn missing_category(id: i64) -> AppError {
    AppError::Validation(crate::error::FieldErrors::single(
        "category_id",
        format!("Invalid pk \"{}\" - object does not exist.", id),
    ))
}
