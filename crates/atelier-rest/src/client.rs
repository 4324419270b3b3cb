//! Authenticated HTTP client shared by every API call.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use atelier_core::{ApiError, error_for_status};
use atelier_platform::{KeyValueError, KeyValueStore};
use reqwest::{Method, RequestBuilder, Response, StatusCode, multipart::Form};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiClientConfig;

/// Session store key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Session store key holding the logged-in email.
pub const USER_EMAIL_KEY: &str = "user_email";
/// Session store key holding the persisted viewed-contact id set.
pub const VIEWED_CONTACTS_KEY: &str = "viewed_contacts";
/// Session store key holding the contact count seen at last visit.
pub const LAST_CONTACT_COUNT_KEY: &str = "last_contact_count";

/// Keys wiped together when a session ends, by logout or by a 401.
const SESSION_KEYS: &[&str] = &[
    TOKEN_KEY,
    USER_EMAIL_KEY,
    VIEWED_CONTACTS_KEY,
    LAST_CONTACT_COUNT_KEY,
];

type SessionExpiredHook = Box<dyn Fn() + Send + Sync>;

/// Authenticated API client for one backend and one session.
///
/// The session store and the expiry hook (the UI-level "redirect to login")
/// are injected at construction, so tests and multiple logins run against
/// isolated clients with no shared global state.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn KeyValueStore>,
    on_session_expired: Option<SessionExpiredHook>,
    torn_down: AtomicBool,
}

impl ApiClient {
    /// Build a client from config and a session store.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying reqwest client cannot be
    /// constructed.
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            store,
            on_session_expired: None,
            torn_down: AtomicBool::new(false),
        })
    }

    /// Register the hook invoked once when the server invalidates the
    /// session. UI layers use this to route back to the login surface.
    pub fn with_session_expired_hook(
        mut self,
        hook: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_session_expired = Some(Box::new(hook));
        self
    }

    /// Current bearer token, when a session exists.
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).ok()
    }

    /// Session store handle, for layers persisting derived markers.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Resolve a relative resource path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| ApiError::Network(format!("invalid url {joined}: {err}")))
    }

    /// GET a JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let request = self.http.get(self.endpoint(path)?);
        self.execute(Method::GET, path, request).await
    }

    /// POST a JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        self.execute(Method::POST, path, request).await
    }

    /// PUT a JSON body.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = self.http.put(self.endpoint(path)?).json(body);
        self.execute(Method::PUT, path, request).await
    }

    /// DELETE a resource.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.endpoint(path)?);
        self.execute(Method::DELETE, path, request).await?;
        Ok(())
    }

    /// POST a multipart form (file uploads and method-override writes).
    pub async fn post_multipart(&self, path: &str, form: Form) -> Result<Value, ApiError> {
        let request = self.http.post(self.endpoint(path)?).multipart(form);
        self.execute(Method::POST, path, request).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let request = self.authorize(request);
        debug!(%method, path, "issuing api request");

        let response = request.send().await.map_err(map_transport_error)?;
        self.read_response(path, response).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => request.bearer_auth(token),
            // No stored token means the caller is anonymous; that is normal.
            Err(KeyValueError::NotFound) => request,
            // A broken store is not: the request still goes out without
            // credentials, but that downgrade must be visible in the logs.
            Err(err) => {
                warn!(error = %err, "session store unreadable; sending request unauthenticated");
                request
            }
        }
    }

    async fn read_response(&self, path: &str, response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let err = error_for_status(status.as_u16(), body.as_ref());
            warn!(path, status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }

        Ok(body.unwrap_or(Value::Null))
    }

    /// Record a fresh session: token and email, and re-arm expiry handling.
    pub(crate) fn store_session(&self, token: &str, user_email: &str) -> Result<(), KeyValueError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_EMAIL_KEY, user_email)?;
        self.torn_down.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Wipe the session keys. Safe to call with no session present.
    pub(crate) fn clear_session_keys(&self) {
        for key in SESSION_KEYS {
            match self.store.remove(key) {
                Ok(()) | Err(KeyValueError::NotFound) => {}
                Err(err) => warn!(key, error = %err, "failed clearing session key"),
            }
        }
    }

    /// Tear the session down after a 401: clear keys, fire the expiry hook.
    ///
    /// Idempotent per session. Concurrent 401s race on one atomic flag, so
    /// the keys are cleared and the hook fired exactly once until the next
    /// login re-arms the guard.
    fn expire_session(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }

        warn!("session invalidated by server; tearing down");
        self.clear_session_keys();
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}
