//! Authenticate the caller from the `Authorization` header (`Token <key>` or `Bearer <key>`).

use crate::auth::token_from_authorization;
use crate::error::AppError;
use crate::models::User;
use crate::service::CatalogService;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// The authenticated user and the token key they presented.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let not_provided = || AppError::Unauthorized("Authentication credentials were not provided.".into());
        let value = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(not_provided)?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid token header.".into()))?;

        let scheme = value.split_whitespace().next().unwrap_or("");
        if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")) {
            return Err(not_provided());
        }
        let key = token_from_authorization(value)
            .map(str::to_string)
            .ok_or_else(|| AppError::Unauthorized("Invalid token header.".into()))?;

        let user = CatalogService::authenticate(state.store.as_ref(), &key).await.map_err(|e| {
            if let AppError::Unauthorized(reason) = &e {
                tracing::warn!(path = %parts.uri.path(), reason = %reason, "authentication failed");
            }
            e
        })?;
        Ok(AuthUser { user, token: key })
    }
}
