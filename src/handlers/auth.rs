//! Token login and logout.

use crate::error::AppError;
use crate::extractors::{AuthUser, Payload};
use crate::response::{self, One};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct TokenBody {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/token/",
    tag = "auth",
    request_body(content = crate::docs::Credentials, description = "JSON or form-encoded credentials"),
    responses(
        (status = 200, description = "Token in a `data` envelope", body = TokenBody),
        (status = 400, description = "Missing fields or bad credentials"),
    )
)]
pub async fn obtain_token(State(state): State<AppState>, Payload(body): Payload) -> Result<One<TokenBody>, AppError> {
    let token = CatalogService::obtain_token(state.store.as_ref(), body).await?;
    Ok(response::ok(TokenBody { token }))
}

#[utoipa::path(
    delete,
    path = "/api/auth/token/",
    tag = "auth",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("token" = []))
)]
pub async fn revoke_token(auth: AuthUser, State(state): State<AppState>) -> Result<StatusCode, AppError> {
    CatalogService::revoke_token(state.store.as_ref(), &auth.token).await?;
    tracing::info!(user_id = auth.user.id, "token revoked");
    Ok(StatusCode::NO_CONTENT)
}
