//! Product list/create and retrieve/update/delete handlers.

use crate::error::AppError;
use crate::extractors::{AuthUser, Payload};
use crate::models::Product;
use crate::query::ProductQuery;
use crate::response::{self, Many, One};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::collections::HashMap;

/// Non-integer ids cannot name a product, so they are reported like unknown ids.
fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {}", id_str)))
}

#[utoipa::path(
    get,
    path = "/api/products/",
    tag = "products",
    params(
        ("search" = Option<String>, Query, description = "Terms matched against product and category name"),
        ("ordering" = Option<String>, Query, description = "price, created_date; prefix with - for descending"),
        ("limit" = Option<u32>, Query, description = "Page size (1-1000); omit for all rows"),
        ("offset" = Option<u32>, Query, description = "Rows to skip when paginating"),
    ),
    responses(
        (status = 200, description = "Products in a `data` envelope", body = [Product]),
        (status = 401, description = "Not authenticated"),
    ),
    security(("token" = []))
)]
pub async fn list_products(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Many<Product>, AppError> {
    let query = ProductQuery::from_params(&params);
    let rows = CatalogService::list_products(state.store.as_ref(), &query).await?;
    Ok(response::page(rows, query.limit, Some(query.offset)))
}

#[utoipa::path(
    post,
    path = "/api/products/",
    tag = "products",
    request_body(content = crate::docs::ProductPayload, description = "JSON or form-encoded product fields"),
    responses(
        (status = 201, description = "Created product in a `data` envelope", body = Product),
        (status = 400, description = "Field-level validation errors"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("token" = []))
)]
pub async fn create_product(
    AuthUser { user, .. }: AuthUser,
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<One<Product>, AppError> {
    let product = CatalogService::create_product(state.store.as_ref(), body).await?;
    tracing::debug!(user_id = user.id, product_id = product.id, "create_product");
    Ok(response::created(product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product in a `data` envelope", body = Product),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such product"),
    ),
    security(("token" = []))
)]
pub async fn retrieve_product(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<One<Product>, AppError> {
    let id = parse_id(&id_str)?;
    let product = CatalogService::get_product(state.store.as_ref(), id).await?;
    Ok(response::ok(product))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body(content = crate::docs::ProductPayload, description = "All product fields"),
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Field-level validation errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such product"),
    ),
    security(("token" = []))
)]
pub async fn update_product(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Payload(body): Payload,
) -> Result<One<Product>, AppError> {
    let id = parse_id(&id_str)?;
    let product = CatalogService::update_product(state.store.as_ref(), id, body, false).await?;
    Ok(response::ok(product))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body(content = crate::docs::ProductPayload, description = "Any subset of product fields"),
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 400, description = "Field-level validation errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such product"),
    ),
    security(("token" = []))
)]
pub async fn partial_update_product(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    Payload(body): Payload,
) -> Result<One<Product>, AppError> {
    let id = parse_id(&id_str)?;
    let product = CatalogService::update_product(state.store.as_ref(), id, body, true).await?;
    Ok(response::ok(product))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No such product"),
    ),
    security(("token" = []))
)]
pub async fn delete_product(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    CatalogService::delete_product(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
