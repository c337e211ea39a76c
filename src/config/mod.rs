//! Service configuration from environment variables (`.env` loaded when present).

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_SCHEMA: &str = "storefront";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Which `Store` implementation backs the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err("expected postgres or memory".into()),
        }
    }
}

/// Credentials for the user created at startup.
#[derive(Clone)]
pub struct SeedUser {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreKind,
    /// Required when `store` is `Postgres`.
    pub database_url: Option<String>,
    /// PostgreSQL schema holding the catalog tables.
    pub schema: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub body_limit_bytes: usize,
    pub seed_user: Option<SeedUser>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store = match get("STOREFRONT_STORE") {
            Some(v) => v.parse().map_err(|reason| ConfigError::Invalid {
                key: "STOREFRONT_STORE",
                value: v,
                reason,
            })?,
            None => StoreKind::Postgres,
        };

        let database_url = get("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let schema = get("STOREFRONT_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_valid_identifier(&schema) {
            return Err(ConfigError::Invalid {
                key: "STOREFRONT_SCHEMA",
                value: schema,
                reason: "must be a lowercase identifier (a-z, 0-9, _)".into(),
            });
        }

        let max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: v,
                reason: e.to_string(),
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    key: "BIND_ADDR",
                    value: DEFAULT_BIND_ADDR.into(),
                    reason: e.to_string(),
                })?,
        };

        let body_limit_bytes = parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), DEFAULT_BODY_LIMIT_BYTES)?;

        let seed_user = match (get("STOREFRONT_ADMIN_USERNAME"), lookup("STOREFRONT_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) if !password.is_empty() => Some(SeedUser { username, password }),
            (Some(_), _) => return Err(ConfigError::Missing("STOREFRONT_ADMIN_PASSWORD")),
            _ => None,
        };

        Ok(AppConfig {
            store,
            database_url,
            schema,
            max_connections,
            bind_addr,
            body_limit_bytes,
            seed_user,
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value: v,
        }),
        None => Ok(default),
    }
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
