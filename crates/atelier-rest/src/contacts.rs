//! Client-only "already seen" markers for the contacts inbox.
//!
//! The backend has no read/unread flag on contact submissions, so the admin
//! UI keeps its own marker set in the durable session store. Markers are
//! merged with what is already stored, never overwritten wholesale, and the
//! whole set is wiped with the rest of the session on logout or expiry.

use std::collections::BTreeSet;

use atelier_platform::KeyValueError;
use tracing::warn;

use crate::client::{ApiClient, LAST_CONTACT_COUNT_KEY, VIEWED_CONTACTS_KEY};

impl ApiClient {
    /// Ids of contact submissions the admin has already opened.
    pub fn viewed_contacts(&self) -> BTreeSet<u64> {
        let Ok(raw) = self.store().get(VIEWED_CONTACTS_KEY) else {
            return BTreeSet::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "viewed-contacts marker set did not parse; starting empty");
            BTreeSet::new()
        })
    }

    /// Mark one contact as seen (union with the stored set).
    pub fn mark_contact_viewed(&self, id: u64) -> Result<(), KeyValueError> {
        let mut viewed = self.viewed_contacts();
        viewed.insert(id);
        self.save_viewed_contacts(&viewed)
    }

    /// Merge a batch of seen ids into the stored set and return the union.
    pub fn merge_viewed_contacts(
        &self,
        ids: impl IntoIterator<Item = u64>,
    ) -> Result<BTreeSet<u64>, KeyValueError> {
        let mut viewed = self.viewed_contacts();
        viewed.extend(ids);
        self.save_viewed_contacts(&viewed)?;
        Ok(viewed)
    }

    /// Drop the marker for a contact that no longer exists (e.g. after a
    /// confirmed delete).
    pub fn forget_contact(&self, id: u64) -> Result<(), KeyValueError> {
        let mut viewed = self.viewed_contacts();
        if viewed.remove(&id) {
            self.save_viewed_contacts(&viewed)?;
        }
        Ok(())
    }

    /// Contact count at the admin's last visit, used for "new" badges.
    pub fn last_contact_count(&self) -> Option<u64> {
        self.store()
            .get(LAST_CONTACT_COUNT_KEY)
            .ok()
            .and_then(|raw| raw.parse().ok())
    }

    /// Persist the contact count seen on this visit.
    pub fn set_last_contact_count(&self, count: u64) -> Result<(), KeyValueError> {
        self.store()
            .set(LAST_CONTACT_COUNT_KEY, &count.to_string())
    }

    fn save_viewed_contacts(&self, viewed: &BTreeSet<u64>) -> Result<(), KeyValueError> {
        let encoded = serde_json::to_string(viewed)
            .map_err(|err| KeyValueError::Backend(err.to_string()))?;
        self.store().set(VIEWED_CONTACTS_KEY, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use atelier_platform::{InMemoryKeyValueStore, KeyValueStore};
    use url::Url;

    use super::*;
    use crate::config::ApiClientConfig;

    fn client_with_store(store: InMemoryKeyValueStore) -> ApiClient {
        let config = ApiClientConfig::new(
            Url::parse("http://127.0.0.1:1/").expect("url should parse"),
        );
        ApiClient::new(config, Arc::new(store)).expect("client should build")
    }

    #[test]
    fn markers_merge_without_overwriting() {
        let store = InMemoryKeyValueStore::default();
        store
            .set(VIEWED_CONTACTS_KEY, "[3, 5]")
            .expect("seed should work");
        let client = client_with_store(store);

        let merged = client
            .merge_viewed_contacts([5, 8])
            .expect("merge should work");
        assert_eq!(merged, BTreeSet::from([3, 5, 8]));
        assert_eq!(client.viewed_contacts(), BTreeSet::from([3, 5, 8]));
    }

    #[test]
    fn mark_and_forget_round_trip() {
        let client = client_with_store(InMemoryKeyValueStore::default());

        client.mark_contact_viewed(12).expect("mark should work");
        client.mark_contact_viewed(7).expect("mark should work");
        assert!(client.viewed_contacts().contains(&12));

        client.forget_contact(12).expect("forget should work");
        assert_eq!(client.viewed_contacts(), BTreeSet::from([7]));

        // Forgetting an unknown id is a no-op.
        client.forget_contact(99).expect("forget should work");
    }

    #[test]
    fn corrupt_marker_state_reads_as_empty() {
        let store = InMemoryKeyValueStore::default();
        store
            .set(VIEWED_CONTACTS_KEY, "not json")
            .expect("seed should work");
        let client = client_with_store(store);

        assert!(client.viewed_contacts().is_empty());
    }

    #[test]
    fn last_contact_count_round_trips() {
        let client = client_with_store(InMemoryKeyValueStore::default());
        assert_eq!(client.last_contact_count(), None);

        client.set_last_contact_count(42).expect("set should work");
        assert_eq!(client.last_contact_count(), Some(42));
    }
}
