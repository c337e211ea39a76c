//! PostgreSQL store. Tables live in the schema from `STOREFRONT_SCHEMA` (default `storefront`).

use super::{missing_category, Store};
use crate::error::{AppError, ConfigError};
use crate::models::{AuthToken, Category, NewCategory, NewProduct, Price, Product, ProductCategory, User};
use crate::query::ProductQuery;
use crate::sql;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: String,
    stock_quantity: i32,
    created_date: DateTime<Utc>,
    category_id: i64,
    category_name: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::from_str(&row.price)
            .map_err(|e| AppError::Internal(format!("product {} has unreadable price '{}': {:?}", row.id, row.price, e)))?;
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            category: ProductCategory {
                id: row.category_id,
                name: row.category_name,
            },
            stock_quantity: row.stock_quantity,
            created_date: row.created_date,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            is_active: row.is_active,
            date_joined: row.date_joined,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Connect a pool with `max_connections`.
    pub async fn connect(database_url: &str, schema: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, schema))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create schema, tables and indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), AppError> {
        for ddl in sql::schema_ddl(&self.schema) {
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        tracing::info!(schema = %self.schema, "catalog tables ready");
        Ok(())
    }

    async fn fetch_products(&self, q: &sql::QueryBuf) -> Result<Vec<Product>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, ProductRow>(&q.sql);
        for p in &q.params {
            query = query.bind(p);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Product::try_from).collect()
    }
}

/// Foreign-key violations on product writes mean the category vanished or never existed.
fn product_write_error(e: sqlx::Error, category_id: i64) -> AppError {
    let is_fk = e
        .as_database_error()
        .map(|d| d.is_foreign_key_violation())
        .unwrap_or(false);
    if is_fk {
        missing_category(category_id)
    } else {
        AppError::Db(e)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let sql = sql::select_categories(&self.schema);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let sql = sql::select_category_by_id(&self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Category::from))
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, AppError> {
        let sql = sql::insert_category(&self.schema);
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&input.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
        let q = sql::select_products(&self.schema, query);
        self.fetch_products(&q).await
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let sql = sql::select_product_by_id(&self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Product::try_from).transpose()
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, AppError> {
        let sql = sql::insert_product(&self.schema);
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price.to_string())
            .bind(input.category_id)
            .bind(input.stock_quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| product_write_error(e, input.category_id))?;
        Product::try_from(row)
    }

    async fn update_product(&self, id: i64, input: &NewProduct) -> Result<Option<Product>, AppError> {
        let sql = sql::update_product(&self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price.to_string())
            .bind(input.category_id)
            .bind(input.stock_quantity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| product_write_error(e, input.category_id))?;
        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: i64) -> Result<bool, AppError> {
        let sql = sql::delete_product(&self.schema);
        tracing::debug!(sql = %sql, id, "query");
        let res = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let sql = sql::insert_user(&self.schema);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let unique = e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false);
                if unique {
                    AppError::Conflict(format!("username '{}' is taken", username))
                } else {
                    AppError::Db(e)
                }
            })?;
        Ok(row.into())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = sql::select_user_by_username(&self.schema);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn issue_token(&self, user_id: i64, key: &str) -> Result<AuthToken, AppError> {
        let sql = sql::upsert_token(&self.schema);
        let (key, user_id, created): (String, i64, DateTime<Utc>) = sqlx::query_as(&sql)
            .bind(key)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(AuthToken { key, user_id, created })
    }

    async fn user_for_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let sql = sql::select_user_by_token(&self.schema);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn revoke_token(&self, key: &str) -> Result<bool, AppError> {
        let sql = sql::delete_token(&self.schema);
        let res = sqlx::query(&sql).bind(key).execute(&self.pool).await?;
        Ok(res.rows_affected() > 0)
    }
}

/// Create the database named in `database_url` if it does not exist, connecting through the `postgres` database.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| invalid_url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// The URL may carry a password, so it is not echoed back.
fn invalid_url(reason: String) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        value: "<redacted>".into(),
        reason,
    })
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    // Query values may contain '/'.
    let (without_query, query) = match url.split_once('?') {
        Some((head, q)) => (head, format!("?{}", q)),
        None => (url, String::new()),
    };
    let path_start = without_query
        .rfind('/')
        .ok_or_else(|| invalid_url("no database path".into()))?
        + 1;
    let db_name = without_query[path_start..].trim();
    let admin_url = format!("{}postgres{}", &without_query[..path_start], query);
    Ok((admin_url, db_name.to_string()))
}
