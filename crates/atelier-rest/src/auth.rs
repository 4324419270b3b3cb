//! Login, logout, and session probing.

use atelier_core::{ApiError, LoginCredentials, LoginOutcome, Session};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ApiClient, TOKEN_KEY, USER_EMAIL_KEY};

impl ApiClient {
    /// Authenticate against `/login` and persist the session on success.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, ApiError> {
        let body = self.post_json("login", credentials).await?;
        let outcome: LoginOutcome = serde_json::from_value(body).unwrap_or_default();

        if outcome.success
            && let Some(token) = &outcome.access_token
        {
            self.store_session(token, &credentials.email)
                .map_err(|err| ApiError::Network(format!("failed persisting session: {err}")))?;
            debug!(email = %credentials.email, "login succeeded; session stored");
        }

        Ok(outcome)
    }

    /// End the session: best-effort `/logout` call, then always wipe the
    /// local session keys, even when the network call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.post_json("logout", &Value::Null).await {
            warn!(error = %err, "logout request failed; clearing local session anyway");
        }
        self.clear_session_keys();
    }

    /// Probe `/user` for the authenticated account. `None` on any failure.
    pub async fn check_auth(&self) -> Option<Value> {
        self.get_json("user").await.ok()
    }

    /// Whether a session token is present locally.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The locally persisted session, when both parts are present.
    pub fn session(&self) -> Option<Session> {
        let token = self.store().get(TOKEN_KEY).ok()?;
        let user_email = self.store().get(USER_EMAIL_KEY).ok()?;
        Some(Session { token, user_email })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use atelier_platform::{InMemoryKeyValueStore, KeyValueStore};
    use url::Url;

    use super::*;
    use crate::config::ApiClientConfig;

    fn client_for(server: &mockito::Server, store: InMemoryKeyValueStore) -> ApiClient {
        let config = ApiClientConfig::new(
            Url::parse(&server.url()).expect("mock server url should parse"),
        );
        ApiClient::new(config, Arc::new(store)).expect("client should build")
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            email: "admin@example.org".to_owned(),
            password: "secret".to_owned(),
        }
    }

    #[tokio::test]
    async fn successful_login_persists_token_and_email() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"email": "admin@example.org"}"#.to_owned(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "access_token": "fresh-token"}"#)
            .create_async()
            .await;

        let store = InMemoryKeyValueStore::default();
        let client = client_for(&server, store.clone());

        let outcome = client
            .login(&credentials())
            .await
            .expect("login should work");
        assert!(outcome.success);
        assert_eq!(store.get(TOKEN_KEY).expect("token stored"), "fresh-token");
        assert_eq!(
            store.get(USER_EMAIL_KEY).expect("email stored"),
            "admin@example.org"
        );
        assert!(client.is_authenticated());
        assert_eq!(
            client.session(),
            Some(Session {
                token: "fresh-token".to_owned(),
                user_email: "admin@example.org".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn rejected_login_stores_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "invalid credentials"}"#)
            .create_async()
            .await;

        let store = InMemoryKeyValueStore::default();
        let client = client_for(&server, store.clone());

        let outcome = client
            .login(&credentials())
            .await
            .expect("request should work");
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("invalid credentials"));
        assert!(store.get(TOKEN_KEY).is_err());
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_session_even_when_request_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/logout")
            .with_status(500)
            .create_async()
            .await;

        let store = InMemoryKeyValueStore::default();
        store.set(TOKEN_KEY, "stale").expect("set should work");
        store
            .set(USER_EMAIL_KEY, "admin@example.org")
            .expect("set should work");
        let client = client_for(&server, store.clone());

        client.logout().await;
        assert!(store.get(TOKEN_KEY).is_err());
        assert!(store.get(USER_EMAIL_KEY).is_err());
    }

    #[tokio::test]
    async fn check_auth_returns_none_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/user")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server, InMemoryKeyValueStore::default());
        assert!(client.check_auth().await.is_none());
    }
}
