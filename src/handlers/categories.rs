//! Category list/create handlers.

use crate::error::AppError;
use crate::extractors::{AuthUser, Payload};
use crate::models::Category;
use crate::response::{self, Many, One};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/categories/",
    tag = "categories",
    responses(
        (status = 200, description = "Categories in a `data` envelope", body = [Category]),
        (status = 401, description = "Not authenticated"),
    ),
    security(("token" = []))
)]
pub async fn list_categories(_auth: AuthUser, State(state): State<AppState>) -> Result<Many<Category>, AppError> {
    let rows = CatalogService::list_categories(state.store.as_ref()).await?;
    Ok(response::list(rows))
}

#[utoipa::path(
    post,
    path = "/api/categories/",
    tag = "categories",
    request_body(content = crate::docs::CategoryPayload, description = "JSON or form-encoded category fields"),
    responses(
        (status = 201, description = "Created category in a `data` envelope", body = Category),
        (status = 400, description = "Field-level validation errors"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("token" = []))
)]
pub async fn create_category(
    _auth: AuthUser,
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<One<Category>, AppError> {
    let category = CatalogService::create_category(state.store.as_ref(), body).await?;
    Ok(response::created(category))
}
