//! Generic CRUD facade over the backend's admin resources.
//!
//! One set of functions serves every resource type via the `AdminRecord`
//! contract, hiding the backend's envelope inconsistencies and its
//! multipart-with-method-override update convention.

use atelier_core::{ApiError, normalize_list, normalize_record, types::AdminRecord};
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use tracing::warn;

use crate::client::ApiClient;

/// Binary file carried alongside scalar fields in a write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field the backend expects the file under, e.g. `image`.
    pub field: String,
    /// Original file name reported to the backend.
    pub file_name: String,
    /// MIME content type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Write payload for create/update calls.
///
/// Field order is preserved. Empty scalar values are skipped at serialization
/// time, matching what the admin forms send; array fields expand to repeated
/// `key[]` parts in multipart bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<(String, String)>,
    array_fields: Vec<(String, Vec<String>)>,
    attachment: Option<Attachment>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Add an array-valued field (serialized as repeated `key[]` parts).
    pub fn array(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.array_fields
            .push((key.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Attach a binary file. At most one attachment per payload.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Whether the payload carries a binary attachment.
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    /// Check create-time preconditions before any network I/O.
    fn ensure_required(&self, required: &[&str]) -> Result<(), ApiError> {
        for name in required {
            let in_fields = self
                .fields
                .iter()
                .any(|(key, value)| key == name && !value.trim().is_empty());
            let in_arrays = self
                .array_fields
                .iter()
                .any(|(key, values)| key == name && !values.is_empty());
            let is_attachment = self
                .attachment
                .as_ref()
                .is_some_and(|attachment| attachment.field == *name);

            if !(in_fields || in_arrays || is_attachment) {
                return Err(ApiError::validation(*name, "is required"));
            }
        }
        Ok(())
    }

    /// JSON body for scalar-only writes.
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            if value.is_empty() {
                continue;
            }
            map.insert(key.clone(), Value::String(value.clone()));
        }
        for (key, values) in &self.array_fields {
            map.insert(
                key.clone(),
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(map)
    }

    /// Multipart body for writes carrying a file. `method_override` appends
    /// the `_method` marker field the backend needs because it only accepts
    /// multipart over POST.
    fn to_form(&self, method_override: Option<&str>) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (key, value) in &self.fields {
            if value.is_empty() {
                continue;
            }
            form = form.text(key.clone(), value.clone());
        }
        for (key, values) in &self.array_fields {
            for value in values {
                form = form.text(format!("{key}[]"), value.clone());
            }
        }
        if let Some(attachment) = &self.attachment {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.mime_type)
                .map_err(|err| {
                    ApiError::validation(
                        attachment.field.clone(),
                        format!("invalid mime type '{}': {err}", attachment.mime_type),
                    )
                })?;
            form = form.part(attachment.field.clone(), part);
        }
        if let Some(method) = method_override {
            form = form.text("_method", method.to_owned());
        }
        Ok(form)
    }
}

impl ApiClient {
    /// List all records of a resource, normalized to a flat vector.
    ///
    /// Rows that fail to deserialize are logged under the resource tag and
    /// skipped; a shape the UI can treat as "no items" is never an error.
    pub async fn list<R: AdminRecord>(&self) -> Result<Vec<R>, ApiError> {
        let body = self.get_json(R::PATH).await?;
        Ok(decode_rows(body))
    }

    /// List one page of a resource via the backend's `page`/`limit` query
    /// parameters. Decoding matches [`ApiClient::list`].
    pub async fn list_page<R: AdminRecord>(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Vec<R>, ApiError> {
        let body = self
            .get_json(&format!("{}?page={page}&limit={limit}", R::PATH))
            .await?;
        Ok(decode_rows(body))
    }

    /// Fetch one record by id. `None` when the body decodes to no record.
    pub async fn fetch<R: AdminRecord>(&self, id: u64) -> Result<Option<R>, ApiError> {
        let body = self.get_json(&format!("{}/{id}", R::PATH)).await?;
        match serde_json::from_value::<R>(normalize_record(body)) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                warn!(resource = R::NAME, id, error = %err, "record body did not decode");
                Ok(None)
            }
        }
    }

    /// Create a record. Required fields are validated locally first; a
    /// payload with an attachment goes out as multipart, otherwise JSON.
    pub async fn create<R: AdminRecord>(&self, payload: &Payload) -> Result<Value, ApiError> {
        payload.ensure_required(R::REQUIRED_FIELDS)?;
        if payload.has_attachment() {
            self.post_multipart(R::PATH, payload.to_form(None)?).await
        } else {
            self.post_json(R::PATH, &payload.to_json()).await
        }
    }

    /// Update a record. Attachment payloads use the POST + `_method=PUT`
    /// override the backend requires for multipart; scalar payloads issue a
    /// true PUT with JSON. Callers never see the difference.
    pub async fn update<R: AdminRecord>(
        &self,
        id: u64,
        payload: &Payload,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/{id}", R::PATH);
        if payload.has_attachment() {
            self.post_multipart(&path, payload.to_form(Some("PUT"))?)
                .await
        } else {
            self.put_json(&path, &payload.to_json()).await
        }
    }

    /// Delete a record by id.
    pub async fn delete_record<R: AdminRecord>(&self, id: u64) -> Result<(), ApiError> {
        self.delete(&format!("{}/{id}", R::PATH)).await
    }
}

/// Normalize a list body and decode its rows, skipping rows that do not
/// deserialize.
fn decode_rows<R: AdminRecord>(body: Value) -> Vec<R> {
    let items = normalize_list(R::NAME, body).into_items();

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<R>(item) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(resource = R::NAME, error = %err, "skipping undecodable row")
            }
        }
    }
    records
}
