//! In-process store for tests and local runs without PostgreSQL.

use super::{missing_category, Store};
use crate::error::AppError;
use crate::models::{AuthToken, Category, NewCategory, NewProduct, Product, ProductCategory, User};
use crate::query::ProductQuery;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone)]
struct ProductRecord {
    id: i64,
    name: String,
    description: String,
    price: crate::models::Price,
    category_id: i64,
    stock_quantity: i32,
    created_date: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, ProductRecord>,
    users: BTreeMap<i64, User>,
    tokens: HashMap<String, AuthToken>,
    next_category_id: i64,
    next_product_id: i64,
    next_user_id: i64,
}

impl Tables {
    fn product(&self, record: &ProductRecord) -> Option<Product> {
        let category = self.categories.get(&record.category_id)?;
        Some(Product {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            price: record.price,
            category: ProductCategory::from(category.clone()),
            stock_quantity: record.stock_quantity,
            created_date: record.created_date,
        })
    }
}

/// `BTreeMap` tables behind one lock; ids start at 1 like a serial column.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, AppError> {
        let mut tables = self.write()?;
        let id = next_id(&mut tables.next_category_id);
        let category = Category {
            id,
            name: input.name.clone(),
        };
        tables.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        let tables = self.read()?;
        let mut products: Vec<Product> = tables
            .products
            .values()
            .filter_map(|r| tables.product(r))
            .filter(|p| query.matches(p))
            .collect();
        products.sort_by(|a, b| query.compare(a, b));
        Ok(match query.limit {
            Some(limit) => products
                .into_iter()
                .skip(query.offset as usize)
                .take(limit as usize)
                .collect(),
            None => products,
        })
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let tables = self.read()?;
        Ok(tables.products.get(&id).and_then(|r| tables.product(r)))
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, AppError> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(missing_category(input.category_id));
        }
        let id = next_id(&mut tables.next_product_id);
        let record = ProductRecord {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price,
            category_id: input.category_id,
            stock_quantity: input.stock_quantity,
            created_date: Utc::now(),
        };
        let product = tables
            .product(&record)
            .ok_or_else(|| missing_category(input.category_id))?;
        tables.products.insert(id, record);
        Ok(product)
    }

    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Ok(None);
        }
        if !tables.categories.contains_key(&input.category_id) {
            return Err(missing_category(input.category_id));
        }
        let Some(record) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        record.name = input.name.clone();
        record.description = input.description.clone();
        record.price = input.price;
        record.category_id = input.category_id;
        record.stock_quantity = input.stock_quantity;
        let record = record.clone();
        Ok(tables.product(&record))
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.products.remove(&id).is_some())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!("username '{}' is taken", username)));
        }
        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            date_joined: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.values().find(|u| u.username == username).cloned())
    }

    async fn issue_token(&self, user_id: i64, key: &str) -> Result<AuthToken, AppError> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }
        if let Some(existing) = tables.tokens.values().find(|t| t.user_id == user_id) {
            return Ok(existing.clone());
        }
        let token = AuthToken {
            key: key.to_string(),
            user_id,
            created: Utc::now(),
        };
        tables.tokens.insert(token.key.clone(), token.clone());
        Ok(token)
    }

    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .tokens
            .get(key)
            .and_then(|t| tables.users.get(&t.user_id))
            .cloned())
    }

    async fn revoke_token(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.write()?.tokens.remove(key).is_some())
    }
}
