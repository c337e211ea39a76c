//! Write payload from a JSON, `application/x-www-form-urlencoded` or `multipart/form-data` body.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::{Map, Value};

/// Request body as a JSON value. Form and multipart fields arrive as strings; repeated keys keep the last value.
#[derive(Debug)]
pub struct Payload(pub Value);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Multipart,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase())
        .unwrap_or_default();
    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else {
        BodyKind::Json
    }
}

/// Keep 413 from the body limit; every other body failure is a 400.
fn rejected(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(text)
    } else {
        AppError::BadRequest(text)
    }
}

async fn multipart_fields(mut multipart: Multipart) -> Result<Map<String, Value>, AppError> {
    let mut map = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            tracing::debug!(field = %name, "ignoring uploaded file in payload");
            continue;
        }
        let text = field.text().await.map_err(|e| rejected(e.status(), e.body_text()))?;
        map.insert(name, Value::String(text));
    }
    Ok(map)
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Form => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| rejected(e.status(), e.body_text()))?;
                let map: Map<String, Value> = fields.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
                Ok(Payload(Value::Object(map)))
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| rejected(e.status(), e.body_text()))?;
                Ok(Payload(Value::Object(multipart_fields(multipart).await?)))
            }
            BodyKind::Json => {
                let Json(value) = Json::<Value>::from_request(req, state)
                    .await
                    .map_err(|e| rejected(e.status(), e.body_text()))?;
                Ok(Payload(value))
            }
        }
    }
}
