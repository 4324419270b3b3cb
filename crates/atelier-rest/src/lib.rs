//! Reqwest-backed adapter for the Atelier admin backend.
//!
//! Owns transport details only: bearer-token attachment, session-expiry
//! teardown, envelope-aware CRUD calls, and multipart upload serialization.
//! The contract types it speaks live in `atelier-core`; durable session
//! storage is injected via `atelier-platform`.

/// Login/logout/session probing.
pub mod auth;
/// The authenticated HTTP client.
pub mod client;
/// Environment-derived client configuration.
pub mod config;
/// Client-only viewed markers for the contacts inbox.
pub mod contacts;
/// Generic per-resource CRUD operations and write payloads.
pub mod facade;
/// Fire-and-forget public-site visit counting.
pub mod visits;

pub use client::{
    ApiClient, LAST_CONTACT_COUNT_KEY, TOKEN_KEY, USER_EMAIL_KEY, VIEWED_CONTACTS_KEY,
};
pub use config::{ApiClientConfig, ConfigError};
pub use facade::{Attachment, Payload};
