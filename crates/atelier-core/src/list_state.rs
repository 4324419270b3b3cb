use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{error::ApiError, types::AdminRecord};

/// Load/display phase of an admin list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPhase {
    /// A list request is in flight and nothing authoritative is shown yet.
    Loading,
    /// The authoritative list is populated (possibly empty).
    Ready,
    /// The initial load failed; the authoritative list stays empty and the
    /// page shows a retryable error state.
    Failed(String),
}

/// Proof that a load was started against the current view generation.
///
/// Async resolutions must present their ticket back; a ticket minted before
/// a reload (or before the view was reset) no longer matches and its result
/// is discarded instead of being applied to a list it does not belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Proof that a delete was confirmed for a specific target in the current
/// view generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicket {
    generation: u64,
    target_id: u64,
}

impl DeleteTicket {
    /// Server-assigned id of the record awaiting deletion.
    pub fn target_id(&self) -> u64 {
        self.target_id
    }
}

/// Invalid list-page transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListStateError {
    /// A second delete was requested while one is still unresolved.
    #[error("delete of item {0} is already awaiting confirmation")]
    DeleteConflict(u64),
    /// The requested item is not in the authoritative list.
    #[error("item {0} is not in the list")]
    UnknownItem(u64),
    /// The page is not in a state that allows the operation.
    #[error("list page is not ready")]
    NotReady,
}

/// State machine backing one admin list page.
///
/// The `items` vector is the single source of truth; the filtered view is
/// always recomputed from it, never patched incrementally. Mutations are
/// applied only on confirmed server responses presented with a live ticket.
#[derive(Debug, Clone)]
pub struct ListPage<T: AdminRecord> {
    phase: ListPhase,
    items: Vec<T>,
    query: String,
    pending_delete: Option<DeleteTicket>,
    error_banner: Option<String>,
    generation: u64,
    viewed: HashSet<u64>,
}

impl<T: AdminRecord> Default for ListPage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AdminRecord> ListPage<T> {
    /// Create a page in its pre-load state.
    pub fn new() -> Self {
        Self {
            phase: ListPhase::Loading,
            items: Vec::new(),
            query: String::new(),
            pending_delete: None,
            error_banner: None,
            generation: 0,
            viewed: HashSet::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &ListPhase {
        &self.phase
    }

    /// Authoritative list contents.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Error text surfaced by a failed mutation, if any.
    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    /// Dismiss the mutation error banner.
    pub fn clear_error(&mut self) {
        self.error_banner = None;
    }

    /// Id of the record awaiting delete confirmation, if any.
    pub fn pending_delete_id(&self) -> Option<u64> {
        self.pending_delete.map(|ticket| ticket.target_id)
    }

    /// Start (or restart) loading. Bumps the view generation so resolutions
    /// of older loads and deletes become stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = ListPhase::Loading;
        self.pending_delete = None;
        debug!(resource = T::NAME, generation = self.generation, "list load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the outcome of a load. Returns `true` when the result was
    /// applied, `false` when the ticket was stale and the result dropped.
    pub fn resolve_load(&mut self, ticket: LoadTicket, result: Result<Vec<T>, ApiError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                resource = T::NAME,
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                "dropping stale load result"
            );
            return false;
        }

        match result {
            Ok(items) => {
                debug!(resource = T::NAME, item_count = items.len(), "list load resolved");
                self.items = items;
                self.phase = ListPhase::Ready;
                self.error_banner = None;
            }
            Err(err) => {
                warn!(resource = T::NAME, error = %err, "list load failed");
                self.items.clear();
                self.phase = ListPhase::Failed(err.to_string());
            }
        }
        true
    }

    /// Set the search query. Filtering derives a view; the authoritative
    /// list is untouched.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Clear the search query, restoring the full view.
    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Current search query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Recompute the filtered view: case-insensitive substring match over
    /// each record's searchable fields.
    pub fn visible_items(&self) -> Vec<&T> {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }

        self.items
            .iter()
            .filter(|item| {
                item.search_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Ask for confirmation to delete `target_id`.
    ///
    /// Exactly one delete may be pending per page; a second request while one
    /// is unresolved is rejected, never silently dropped.
    pub fn request_delete(&mut self, target_id: u64) -> Result<DeleteTicket, ListStateError> {
        if self.phase != ListPhase::Ready {
            return Err(ListStateError::NotReady);
        }
        if let Some(pending) = self.pending_delete {
            return Err(ListStateError::DeleteConflict(pending.target_id));
        }
        if !self.items.iter().any(|item| item.record_id() == target_id) {
            return Err(ListStateError::UnknownItem(target_id));
        }

        let ticket = DeleteTicket {
            generation: self.generation,
            target_id,
        };
        self.pending_delete = Some(ticket);
        Ok(ticket)
    }

    /// Back out of a pending delete without touching the list.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Apply the backend's answer to a confirmed delete.
    ///
    /// On success the target leaves the authoritative list (and its viewed
    /// marker); the removed id is returned so callers can purge persisted
    /// markers too. On failure the item stays and the error is surfaced.
    /// Stale tickets resolve to `None` without side effects.
    pub fn resolve_delete(
        &mut self,
        ticket: DeleteTicket,
        result: Result<(), ApiError>,
    ) -> Option<u64> {
        if ticket.generation != self.generation || self.pending_delete != Some(ticket) {
            debug!(
                resource = T::NAME,
                target_id = ticket.target_id,
                "dropping stale delete result"
            );
            return None;
        }

        self.pending_delete = None;
        match result {
            Ok(()) => {
                self.items.retain(|item| item.record_id() != ticket.target_id);
                self.viewed.remove(&ticket.target_id);
                debug!(resource = T::NAME, target_id = ticket.target_id, "delete applied");
                Some(ticket.target_id)
            }
            Err(err) => {
                warn!(
                    resource = T::NAME,
                    target_id = ticket.target_id,
                    error = %err,
                    "delete failed; item kept"
                );
                self.error_banner = Some(err.to_string());
                None
            }
        }
    }

    /// Merge already-seen ids from durable storage. Union semantics: local
    /// markers are never overwritten, only extended.
    pub fn merge_viewed(&mut self, ids: impl IntoIterator<Item = u64>) {
        self.viewed.extend(ids);
    }

    /// Mark one record as seen.
    pub fn mark_viewed(&mut self, id: u64) {
        self.viewed.insert(id);
    }

    /// Whether a record has been seen.
    pub fn is_viewed(&self, id: u64) -> bool {
        self.viewed.contains(&id)
    }

    /// Snapshot of the viewed-marker set for persistence.
    pub fn viewed_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.viewed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
    struct Post {
        id: u64,
        title: String,
    }

    impl AdminRecord for Post {
        const PATH: &'static str = "posts";
        const NAME: &'static str = "posts";
        const REQUIRED_FIELDS: &'static [&'static str] = &["title"];

        fn record_id(&self) -> u64 {
            self.id
        }

        fn search_text(&self) -> Vec<&str> {
            vec![self.title.as_str()]
        }
    }

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            title: title.to_owned(),
        }
    }

    fn loaded_page(items: Vec<Post>) -> ListPage<Post> {
        let mut page = ListPage::new();
        let ticket = page.begin_load();
        assert!(page.resolve_load(ticket, Ok(items)));
        page
    }

    #[test]
    fn load_failure_keeps_empty_list_and_failed_phase() {
        let mut page: ListPage<Post> = ListPage::new();
        let ticket = page.begin_load();
        assert!(page.resolve_load(ticket, Err(ApiError::Network("timed out".to_owned()))));

        assert!(matches!(page.phase(), ListPhase::Failed(_)));
        assert!(page.items().is_empty());
    }

    #[test]
    fn filter_derives_view_without_mutating_items() {
        let mut page = loaded_page(vec![post(1, "A"), post(2, "B")]);

        page.set_query("a");
        let visible: Vec<u64> = page.visible_items().iter().map(|p| p.id).collect();
        assert_eq!(visible, vec![1]);
        assert_eq!(page.items().len(), 2);

        page.clear_query();
        let restored: Vec<u64> = page.visible_items().iter().map(|p| p.id).collect();
        assert_eq!(restored, vec![1, 2]);
    }

    #[test]
    fn confirmed_delete_removes_item_only_after_acknowledgment() {
        let mut page = loaded_page(vec![post(1, "A"), post(2, "B")]);

        let ticket = page.request_delete(2).expect("delete request should work");
        // Untouched until the backend answers.
        assert_eq!(page.items().len(), 2);
        assert_eq!(page.pending_delete_id(), Some(2));

        let removed = page.resolve_delete(ticket, Ok(()));
        assert_eq!(removed, Some(2));
        let remaining: Vec<u64> = page.items().iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![1]);
        assert_eq!(page.pending_delete_id(), None);
    }

    #[test]
    fn failed_delete_keeps_item_and_surfaces_error() {
        let mut page = loaded_page(vec![post(1, "A"), post(2, "B")]);

        let ticket = page.request_delete(2).expect("delete request should work");
        let removed = page.resolve_delete(
            ticket,
            Err(ApiError::RequestFailed {
                status: 500,
                message: "server error".to_owned(),
                field_errors: None,
            }),
        );

        assert_eq!(removed, None);
        assert_eq!(page.items().len(), 2);
        assert!(page.error_banner().is_some());
        // The page is usable again: a new delete may be requested.
        page.request_delete(2).expect("retry should be allowed");
    }

    #[test]
    fn rejects_second_delete_while_one_is_pending() {
        let mut page = loaded_page(vec![post(1, "A"), post(2, "B")]);

        page.request_delete(1).expect("first request should work");
        let err = page
            .request_delete(2)
            .expect_err("second request must be rejected");
        assert_eq!(err, ListStateError::DeleteConflict(1));
    }

    #[test]
    fn cancel_returns_to_ready_without_changes() {
        let mut page = loaded_page(vec![post(1, "A")]);

        page.request_delete(1).expect("request should work");
        page.cancel_delete();
        assert_eq!(page.pending_delete_id(), None);
        assert_eq!(page.items().len(), 1);
    }

    #[test]
    fn stale_load_result_is_dropped_after_reload() {
        let mut page: ListPage<Post> = ListPage::new();
        let old_ticket = page.begin_load();
        let new_ticket = page.begin_load();

        assert!(!page.resolve_load(old_ticket, Ok(vec![post(9, "stale")])));
        assert!(page.resolve_load(new_ticket, Ok(vec![post(1, "fresh")])));
        assert_eq!(page.items()[0].id, 1);
    }

    #[test]
    fn stale_delete_result_is_dropped_after_reload() {
        let mut page = loaded_page(vec![post(1, "A")]);
        let delete_ticket = page.request_delete(1).expect("request should work");

        // The user navigated away and back; the page reloaded meanwhile.
        let load_ticket = page.begin_load();
        assert!(page.resolve_load(load_ticket, Ok(vec![post(1, "A")])));

        assert_eq!(page.resolve_delete(delete_ticket, Ok(())), None);
        assert_eq!(page.items().len(), 1);
    }

    #[test]
    fn viewed_markers_merge_and_follow_deletes() {
        let mut page = loaded_page(vec![post(1, "A"), post(2, "B")]);

        page.merge_viewed([2]);
        page.mark_viewed(1);
        assert!(page.is_viewed(1));
        assert!(page.is_viewed(2));
        assert_eq!(page.viewed_ids(), vec![1, 2]);

        let ticket = page.request_delete(2).expect("request should work");
        page.resolve_delete(ticket, Ok(()));
        assert!(!page.is_viewed(2));
        assert_eq!(page.viewed_ids(), vec![1]);
    }

    #[test]
    fn delete_requires_known_item_and_ready_phase() {
        let mut page: ListPage<Post> = ListPage::new();
        assert_eq!(page.request_delete(1), Err(ListStateError::NotReady));

        let mut page = loaded_page(vec![post(1, "A")]);
        assert_eq!(page.request_delete(42), Err(ListStateError::UnknownItem(42)));
    }
}
