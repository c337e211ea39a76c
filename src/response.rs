//! Response envelope: `{ "data": .. }` for one record, `{ "data": [..], "meta": {..} }` for lists.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

#[derive(Serialize)]
pub struct ListMeta {
    pub count: u64,
    /// Present only for paginated requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

pub type One<T> = (StatusCode, Json<SuccessOne<T>>);
pub type Many<T> = (StatusCode, Json<SuccessMany<T>>);

pub fn created<T: Serialize>(data: T) -> One<T> {
    (StatusCode::CREATED, Json(SuccessOne { data }))
}

pub fn ok<T: Serialize>(data: T) -> One<T> {
    (StatusCode::OK, Json(SuccessOne { data }))
}

pub fn list<T: Serialize>(data: Vec<T>) -> Many<T> {
    page(data, None, None)
}

/// List response echoing pagination when `limit` was requested.
pub fn page<T: Serialize>(data: Vec<T>, limit: Option<u32>, offset: Option<u32>) -> Many<T> {
    let count = data.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessMany {
            data,
            meta: ListMeta {
                count,
                limit,
                offset: limit.and(offset),
            },
        }),
    )
}
