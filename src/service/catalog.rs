//! Catalog operations: payload validation, reference checks, then storage.

use super::validation::{expect_object, validate_category, validate_credentials, ProductChanges};
use crate::auth;
use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};
use crate::models::{Category, NewProduct, Product, User};
use crate::query::ProductQuery;
use crate::store::Store;
use serde_json::Value;
use tracing::{info, warn};

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub struct CatalogService;

impl CatalogService {
    pub async fn list_categories(store: &dyn Store) -> Result<Vec<Category>, AppError> {
        store.list_categories().await
    }

    pub async fn create_category(store: &dyn Store, body: Value) -> Result<Category, AppError> {
        let input = validate_category(&expect_object(body)?)?;
        let category = store.create_category(&input).await?;
        info!(category_id = category.id, name = %category.name, "category created");
        Ok(category)
    }

    pub async fn list_products(store: &dyn Store, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        store.list_products(query).await
    }

    pub async fn get_product(store: &dyn Store, id: i64) -> Result<Product, AppError> {
        store
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    pub async fn create_product(store: &dyn Store, body: Value) -> Result<Product, AppError> {
        let body = expect_object(body)?;
        let (changes, errors) = ProductChanges::from_body(&body, false);
        let input = Self::checked(store, changes, errors, None).await?;
        let product = store.create_product(&input).await?;
        info!(product_id = product.id, category_id = product.category.id, "product created");
        Ok(product)
    }

    /// `partial` selects PATCH semantics: only supplied fields are validated and changed.
    pub async fn update_product(store: &dyn Store, id: i64, body: Value, partial: bool) -> Result<Product, AppError> {
        let existing = Self::get_product(store, id).await?;
        let body = expect_object(body)?;
        let (changes, errors) = ProductChanges::from_body(&body, partial);
        let input = Self::checked(store, changes, errors, Some(NewProduct::from(&existing))).await?;
        let product = store
            .update_product(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
        info!(product_id = id, partial, "product updated");
        Ok(product)
    }

    pub async fn delete_product(store: &dyn Store, id: i64) -> Result<(), AppError> {
        if !store.delete_product(id).await? {
            return Err(AppError::NotFound(format!("product {}", id)));
        }
        info!(product_id = id, "product deleted");
        Ok(())
    }

    /// Resolve the category reference, then fail with every field error at once.
    async fn checked(
        store: &dyn Store,
        changes: ProductChanges,
        mut errors: FieldErrors,
        base: Option<NewProduct>,
    ) -> Result<NewProduct, AppError> {
        if let Some(category_id) = changes.category_id {
            if store.get_category(category_id).await?.is_none() {
                errors.add(
                    "category_id",
                    format!("Invalid pk \"{}\" - object does not exist.", category_id),
                );
            }
        }
        errors.into_result()?;
        changes.merge(base)
    }

    pub async fn register_user(store: &dyn Store, username: &str, password: &str) -> Result<User, AppError> {
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;
        let user = store.create_user(username, &hash).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Exchange credentials for the user's API token.
    pub async fn obtain_token(store: &dyn Store, body: Value) -> Result<String, AppError> {
        let (username, password) = validate_credentials(&expect_object(body)?)?;
        let bad_credentials = || AppError::Validation(FieldErrors::single(NON_FIELD_ERRORS, BAD_CREDENTIALS));

        let Some(user) = store.find_user_by_username(&username).await? else {
            warn!(username = %username, "login for unknown user");
            return Err(bad_credentials());
        };
        let stored = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || auth::verify_password(&stored, &password))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;
        if !valid || !user.is_active {
            warn!(user_id = user.id, "login rejected");
            return Err(bad_credentials());
        }
        let token = store.issue_token(user.id, &auth::generate_token_key()).await?;
        info!(user_id = user.id, "token issued");
        Ok(token.key)
    }

    pub async fn revoke_token(store: &dyn Store, key: &str) -> Result<(), AppError> {
        store.revoke_token(key).await?;
        Ok(())
    }

    /// Resolve a token key to an active user.
    pub async fn authenticate(store: &dyn Store, key: &str) -> Result<User, AppError> {
        match store.user_for_token(key).await? {
            Some(user) if user.is_active => Ok(user),
            Some(user) => {
                warn!(user_id = user.id, "token for inactive user");
                Err(AppError::Unauthorized("User inactive or deleted.".into()))
            }
            None => Err(AppError::Unauthorized("Invalid token.".into())),
        }
    }
}
