//! OpenAPI document for the catalog API, served at `/api/openapi.json`.

use crate::handlers::{auth, categories, products};
use crate::models::{Category, Product, ProductCategory};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Product write fields. `category_id` references an existing category.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ProductPayload {
    #[schema(example = "Laptop", max_length = 255)]
    name: String,
    #[schema(example = "A powerful laptop.")]
    description: Option<String>,
    #[schema(value_type = String, example = "1200.00")]
    price: String,
    #[schema(example = 1)]
    category_id: i64,
    #[schema(example = 30, minimum = 0)]
    stock_quantity: i32,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CategoryPayload {
    #[schema(example = "Electronics", max_length = 255)]
    name: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct Credentials {
    username: String,
    password: String,
}

struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "`Token <key>` from POST /api/auth/token/",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        products::list_products,
        products::create_product,
        products::retrieve_product,
        products::update_product,
        products::partial_update_product,
        products::delete_product,
        categories::list_categories,
        categories::create_category,
        auth::obtain_token,
        auth::revoke_token,
    ),
    components(schemas(
        Product,
        ProductCategory,
        Category,
        ProductPayload,
        CategoryPayload,
        Credentials,
        auth::TokenBody,
    )),
    modifiers(&TokenSecurity),
    tags(
        (name = "products", description = "Sellable items"),
        (name = "categories", description = "Product groupings"),
        (name = "auth", description = "API tokens"),
    )
)]
pub struct ApiDoc;
