use serde::Serialize;
use utoipa::ToSchema;

/// A named grouping for products.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Category {
    pub id: i64,
    #[schema(example = "Electronics")]
    pub name: String,
}

/// Validated category write payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
}
