//! Catalog API routes, mounted under `/api`. Every path answers with and without a trailing slash.

use crate::docs::ApiDoc;
use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::handlers::{auth, categories, products};
use crate::state::AppState;
use axum::{
    routing::{get, post, MethodRouter},
    Json, Router,
};
use utoipa::OpenApi;

/// Register `route` at `path` and at `path` + `/`.
fn slash_optional(router: Router<AppState>, path: &str, route: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, route.clone())
        .route(&format!("{}/", path), route)
}

/// Unsupported method on a protected resource: 401 without valid credentials, 405 otherwise.
async fn method_not_allowed(_auth: AuthUser) -> AppError {
    AppError::MethodNotAllowed
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn api_routes(state: AppState) -> Router {
    let mut router = Router::new();
    router = slash_optional(
        router,
        "/products",
        get(products::list_products)
            .post(products::create_product)
            .fallback(method_not_allowed),
    );
    router = slash_optional(
        router,
        "/products/:id",
        get(products::retrieve_product)
            .put(products::update_product)
            .patch(products::partial_update_product)
            .delete(products::delete_product)
            .fallback(method_not_allowed),
    );
    router = slash_optional(
        router,
        "/categories",
        get(categories::list_categories)
            .post(categories::create_category)
            .fallback(method_not_allowed),
    );
    router = slash_optional(
        router,
        "/auth/token",
        post(auth::obtain_token).delete(auth::revoke_token),
    );
    router.route("/openapi.json", get(openapi)).with_state(state)
}
