//! Public-site visit counter.
//!
//! Tracking is fire-and-forget: a failed beacon must never disturb the page
//! that sent it, so errors are logged and swallowed. Reading the counter
//! degrades to zero on any failure for the same reason.

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::client::ApiClient;

impl ApiClient {
    /// Report a page visit to `/track-visit`. Errors are swallowed.
    pub async fn track_visit(&self, page: &str) {
        if let Err(err) = self.post_json("track-visit", &json!({ "page": page })).await {
            debug!(page, error = %err, "visit beacon failed");
        }
    }

    /// Total visit count from `/track-visit`. Zero on any failure or when
    /// the body carries no usable `total` field.
    pub async fn visit_count(&self) -> u64 {
        match self.get_json("track-visit").await {
            Ok(body) => body.get("total").and_then(Value::as_u64).unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "failed fetching visit count");
                0
            }
        }
    }
}
