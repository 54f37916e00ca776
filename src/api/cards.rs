//! Card CRUD calls.
//!
//! Cards are view-local data: fetched per request, never owned by the
//! session store. Every call attaches the bearer token from the session
//! store; without an active session the call fails locally.

use crate::api::error::{error_from_response, ApiError, ApiResult};
use crate::api::types::{Card, CardForm, CardPatch, ServerMessage};
use crate::config::ApiConfig;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Client for the card endpoints.
pub struct CardClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl CardClient {
    pub fn new(config: ApiConfig, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            config,
            http,
            session,
        })
    }

    fn cards_url(&self, path: &str) -> String {
        self.config.endpoint(&format!("/cards{path}"))
    }

    fn bearer(&self) -> ApiResult<String> {
        self.session
            .token()
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::NoSession)
    }

    /// List all cards owned by a user.
    pub async fn list(&self, user_id: &str) -> ApiResult<Vec<Card>> {
        let resp = self
            .http
            .get(self.cards_url(&format!("/user/{user_id}")))
            .header("Authorization", self.bearer()?)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Create a card under a user. Validates the form locally first; a
    /// validation failure returns before any request is issued.
    pub async fn create(&self, user_id: &str, form: &CardForm) -> ApiResult<Card> {
        form.validate()?;

        let resp = self
            .http
            .post(self.cards_url(&format!("/create/{user_id}")))
            .header("Authorization", self.bearer()?)
            .json(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Apply a partial update to a card.
    pub async fn update(&self, card_id: i64, patch: &CardPatch) -> ApiResult<Card> {
        let resp = self
            .http
            .put(self.cards_url(&format!("/{card_id}/update")))
            .header("Authorization", self.bearer()?)
            .json(patch)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Delete a card. Returns the server's confirmation message.
    pub async fn delete(&self, card_id: i64) -> ApiResult<String> {
        let resp = self
            .http
            .delete(self.cards_url(&format!("/{card_id}/delete")))
            .header("Authorization", self.bearer()?)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let reply: ServerMessage = resp
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        Ok(reply.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserRecord;
    use crate::session::MemoryStorage;

    fn test_session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(Box::new(MemoryStorage::new())))
    }

    fn test_client(session: Arc<SessionStore>) -> CardClient {
        CardClient::new(ApiConfig::new("http://localhost:3000"), session).unwrap()
    }

    #[test]
    fn cards_url_construction() {
        let client = test_client(test_session());
        assert_eq!(
            client.cards_url("/user/7"),
            "http://localhost:3000/api/cards/user/7"
        );
        assert_eq!(
            client.cards_url("/create/7"),
            "http://localhost:3000/api/cards/create/7"
        );
        assert_eq!(
            client.cards_url("/12/update"),
            "http://localhost:3000/api/cards/12/update"
        );
        assert_eq!(
            client.cards_url("/12/delete"),
            "http://localhost:3000/api/cards/12/delete"
        );
    }

    #[tokio::test]
    async fn list_without_session_fails_before_any_request() {
        let client = test_client(test_session());
        let err = client.list("7").await.unwrap_err();
        assert!(matches!(err, ApiError::NoSession));
    }

    #[tokio::test]
    async fn create_rejects_invalid_form_before_any_request() {
        let session = test_session();
        session.login(UserRecord::new("7"), "tok123");
        let client = test_client(session);

        let form = CardForm {
            nombre: "Ahorros".into(),
            tipo_tarjeta: "débito".into(),
            banco: "BBVA".into(),
            numero: "not-a-number".into(),
            saldo: 10.0,
        };

        let err = client.create("7", &form).await.unwrap_err();
        match err {
            ApiError::Validation(fields) => assert!(fields.0.contains_key("numero")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn bearer_uses_session_token() {
        let session = test_session();
        session.login(UserRecord::new("7"), "tok123");

        let client = test_client(session);
        assert_eq!(client.bearer().unwrap(), "Bearer tok123");
    }
}
