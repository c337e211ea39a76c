use chrono::{DateTime, Utc};

/// An API account. The password hash never leaves the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Opaque API key bound to one user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}
