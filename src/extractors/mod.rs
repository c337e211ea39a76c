//! Request extractors: authenticated caller and write payloads.

pub mod auth;
pub mod payload;
pub use auth::AuthUser;
pub use payload::Payload;
