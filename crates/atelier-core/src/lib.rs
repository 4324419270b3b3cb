//! Core client contract shared by the Atelier admin surfaces.
//!
//! This crate defines the error taxonomy, response-envelope normalization,
//! domain record types, and the list-page state machine every admin screen
//! instantiates. It is transport-agnostic; the HTTP layer lives in
//! `atelier-rest`.

/// Response-envelope normalization for inconsistent list endpoints.
pub mod envelope;
/// Stable client error types and HTTP status classification.
pub mod error;
/// List-page state machine: load, filter, confirm-before-delete.
pub mod list_state;
/// Domain record types and the `AdminRecord` resource contract.
pub mod types;

pub use envelope::{NormalizedList, normalize_list, normalize_record};
pub use error::{ApiError, FieldErrors, error_for_status};
pub use list_state::{DeleteTicket, ListPage, ListPhase, ListStateError, LoadTicket};
pub use types::{
    AdminRecord, Career, ContactMessage, Faq, GalleryItem, LoginCredentials, LoginOutcome, Member,
    NewsItem, Project, Service, Session, SiteSettings, Testimonial,
};
