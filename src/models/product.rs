use super::{Category, Price};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Category as embedded in a product representation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductCategory {
    pub id: i64,
    pub name: String,
}

impl From<Category> for ProductCategory {
    fn from(c: Category) -> Self {
        ProductCategory { id: c.id, name: c.name }
    }
}

/// A sellable item. The category is expanded on read; writes reference it by `category_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Product {
    pub id: i64,
    #[schema(example = "Laptop")]
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "1200.00")]
    pub price: Price,
    pub category: ProductCategory,
    pub stock_quantity: i32,
    pub created_date: DateTime<Utc>,
}

/// Validated product write payload. Also the merged state for partial updates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: i64,
    pub stock_quantity: i32,
}

impl From<&Product> for NewProduct {
    fn from(p: &Product) -> Self {
        NewProduct {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            category_id: p.category.id,
            stock_quantity: p.stock_quantity,
        }
    }
}
