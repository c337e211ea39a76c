//! Builds parameterized catalog statements. Identifiers come from code and config only; values are always parameters.

use crate::query::ProductQuery;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Columns of a product row joined with its category (`p` and `c` aliases).
/// Price is read as text so it parses without a decimal type.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price::text AS price, p.stock_quantity, \
     p.created_date, c.id AS category_id, c.name AS category_name";

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<String>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: String) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }
}

/// Escape LIKE wildcards so a search term matches literally.
fn like_contains(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn product_from(schema: &str) -> String {
    format!(
        "{} p JOIN {} c ON c.id = p.category_id",
        qualified_table(schema, "products"),
        qualified_table(schema, "categories")
    )
}

/// SELECT products with search terms (ILIKE on product and category name), ordering, and optional limit/offset.
pub fn select_products(schema: &str, query: &ProductQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut conditions: Vec<String> = Vec::new();
    for term in &query.search_terms {
        let n = q.push_param(like_contains(term));
        conditions.push(format!("(p.name ILIKE ${n} OR c.name ILIKE ${n})"));
    }

    let mut order_by: Vec<String> = query
        .ordering
        .iter()
        .map(|k| format!("p.{} {}", k.field.column(), if k.descending { "DESC" } else { "ASC" }))
        .collect();
    order_by.push("p.id ASC".into());

    q.sql = format!("SELECT {} FROM {}", PRODUCT_COLUMNS, product_from(schema));
    if !conditions.is_empty() {
        q.sql.push_str(" WHERE ");
        q.sql.push_str(&conditions.join(" AND "));
    }
    q.sql.push_str(" ORDER BY ");
    q.sql.push_str(&order_by.join(", "));
    if let Some(limit) = query.limit {
        q.sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, query.offset));
    }
    q
}

/// SELECT one product by id ($1).
pub fn select_product_by_id(schema: &str) -> String {
    format!("SELECT {} FROM {} WHERE p.id = $1", PRODUCT_COLUMNS, product_from(schema))
}

/// INSERT product ($1 name, $2 description, $3 price text, $4 category_id, $5 stock_quantity) returning the joined row.
pub fn insert_product(schema: &str) -> String {
    format!(
        "WITH p AS (INSERT INTO {} (name, description, price, category_id, stock_quantity) \
         VALUES ($1, $2, $3::numeric, $4, $5) RETURNING *) \
         SELECT {} FROM p JOIN {} c ON c.id = p.category_id",
        qualified_table(schema, "products"),
        PRODUCT_COLUMNS,
        qualified_table(schema, "categories")
    )
}

/// UPDATE product $6 with the same parameters as `insert_product`.
pub fn update_product(schema: &str) -> String {
    format!(
        "WITH p AS (UPDATE {} SET name = $1, description = $2, price = $3::numeric, category_id = $4, \
         stock_quantity = $5 WHERE id = $6 RETURNING *) \
         SELECT {} FROM p JOIN {} c ON c.id = p.category_id",
        qualified_table(schema, "products"),
        PRODUCT_COLUMNS,
        qualified_table(schema, "categories")
    )
}

pub fn delete_product(schema: &str) -> String {
    format!("DELETE FROM {} WHERE id = $1", qualified_table(schema, "products"))
}

pub fn select_categories(schema: &str) -> String {
    format!("SELECT id, name FROM {} ORDER BY id", qualified_table(schema, "categories"))
}

pub fn select_category_by_id(schema: &str) -> String {
    format!("SELECT id, name FROM {} WHERE id = $1", qualified_table(schema, "categories"))
}

pub fn insert_category(schema: &str) -> String {
    format!(
        "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
        qualified_table(schema, "categories")
    )
}

const USER_COLUMNS: &str = "id, username, password_hash, is_active, date_joined";

pub fn insert_user(schema: &str) -> String {
    format!(
        "INSERT INTO {} (username, password_hash) VALUES ($1, $2) RETURNING {}",
        qualified_table(schema, "users"),
        USER_COLUMNS
    )
}

pub fn select_user_by_username(schema: &str) -> String {
    format!(
        "SELECT {} FROM {} WHERE username = $1",
        USER_COLUMNS,
        qualified_table(schema, "users")
    )
}

/// Insert token ($1 key, $2 user_id) or return the user's existing one.
pub fn upsert_token(schema: &str) -> String {
    format!(
        "INSERT INTO {} (key, user_id) VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
         RETURNING key, user_id, created",
        qualified_table(schema, "auth_tokens")
    )
}

pub fn select_user_by_token(schema: &str) -> String {
    format!(
        "SELECT u.id, u.username, u.password_hash, u.is_active, u.date_joined \
         FROM {} t JOIN {} u ON u.id = t.user_id WHERE t.key = $1",
        qualified_table(schema, "auth_tokens"),
        qualified_table(schema, "users")
    )
}

pub fn delete_token(schema: &str) -> String {
    format!("DELETE FROM {} WHERE key = $1", qualified_table(schema, "auth_tokens"))
}

/// Idempotent DDL for the catalog and account tables, in dependency order.
pub fn schema_ddl(schema: &str) -> Vec<String> {
    let categories = qualified_table(schema, "categories");
    let products = qualified_table(schema, "products");
    let users = qualified_table(schema, "users");
    let tokens = qualified_table(schema, "auth_tokens");
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {categories} (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {products} (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
                category_id BIGINT NOT NULL REFERENCES {categories} (id) ON DELETE CASCADE,
                stock_quantity INTEGER NOT NULL CHECK (stock_quantity >= 0),
                created_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS products_category_id_idx ON {products} (category_id)"),
        format!("CREATE INDEX IF NOT EXISTS products_created_date_idx ON {products} (created_date)"),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {users} (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(150) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {tokens} (
                key VARCHAR(40) PRIMARY KEY,
                user_id BIGINT NOT NULL UNIQUE REFERENCES {users} (id) ON DELETE CASCADE,
                created TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
    ]
}
