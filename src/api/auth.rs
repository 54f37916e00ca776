//! Registration, login and email-verification calls.
//!
//! Stateless request/response against `/api/auth/*`. Successful logins
//! yield a [`LoginResponse`] for the caller to install into the session
//! store; nothing here mutates state. Registration never yields a session
//! — the account must verify its email first.

use crate::api::error::{error_from_response, ApiError, ApiResult};
use crate::api::types::{FieldErrors, LoginResponse, RegisterForm, ServerMessage};
use crate::config::ApiConfig;
use std::time::Duration;

/// Client for the authentication endpoints.
pub struct AuthClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    fn auth_url(&self, path: &str) -> String {
        self.config.endpoint(&format!("/auth{path}"))
    }

    /// Register a new account. Validates the form locally first; a
    /// validation failure returns before any request is issued. Success
    /// means a verification mail was sent, not that a session exists.
    pub async fn register(&self, form: &RegisterForm) -> ApiResult<String> {
        form.validate()?;

        let resp = self
            .http
            .post(self.auth_url("/register"))
            .json(&form.body())
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

    /// Authenticate with email + password. The returned payload is
    /// guaranteed to carry a non-empty token and user id; anything less
    /// is reported as a malformed response and must not be installed.
    pub async fn login(&self, correo: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = serde_json::json!({ "correo": correo, "password": password });

        let resp = self
            .http
            .post(self.auth_url("/login"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let login: LoginResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        validate_login_payload(login)
    }

    /// Redeem a one-time verification token. The token travels as a query
    /// parameter, not a path segment.
    pub async fn verify_email(&self, token: &str) -> ApiResult<String> {
        if token.trim().is_empty() {
            let mut errors = FieldErrors::default();
            errors.insert("token", "Token de verificación no válido");
            return Err(errors.into());
        }

        let url = format!(
            "{}?token={}",
            self.auth_url("/verify"),
            urlencoding::encode(token)
        );
        let resp = self.http.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let reply: ServerMessage = resp
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        Ok(reply.message)
    }

    /// Ask the server to send a fresh verification mail.
    pub async fn resend_verification(&self, correo: &str) -> ApiResult<String> {
        let body = serde_json::json!({ "correo": correo });

        let resp = self
            .http
            .post(self.auth_url("/resend-verification"))
            .json(&body)
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

/// Reject login payloads that deserialized but carry empty identity.
/// Only payloads passing this check may be installed into a session store.
fn validate_login_payload(login: LoginResponse) -> ApiResult<LoginResponse> {
    if login.token.is_empty() {
        return Err(ApiError::MalformedResponse("empty token".into()));
    }
    if login.user.id.is_empty() {
        return Err(ApiError::MalformedResponse("empty user id".into()));
    }
    Ok(login)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserRecord;
    use crate::session::{MemoryStorage, SessionStore};

    fn test_client() -> AuthClient {
        AuthClient::new(ApiConfig::new("http://localhost:3000")).unwrap()
    }

    #[test]
    fn auth_url_construction() {
        let client = test_client();
        assert_eq!(
            client.auth_url("/login"),
            "http://localhost:3000/api/auth/login"
        );
        assert_eq!(
            client.auth_url("/resend-verification"),
            "http://localhost:3000/api/auth/resend-verification"
        );
    }

    #[test]
    fn verify_url_encodes_token_as_query_param() {
        let client = test_client();
        let url = format!(
            "{}?token={}",
            client.auth_url("/verify"),
            urlencoding::encode("abc+/=")
        );
        assert_eq!(
            url,
            "http://localhost:3000/api/auth/verify?token=abc%2B%2F%3D"
        );
    }

    #[tokio::test]
    async fn register_rejects_pin_mismatch_before_any_request() {
        let client = test_client();
        let form = RegisterForm {
            nombre: "Ana".into(),
            correo: "ana@example.com".into(),
            telefono: "3001234567".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            pin: "1234".into(),
            confirm_pin: "9999".into(),
        };

        // Local validation fires first, so no request is issued even
        // though nothing is listening on the configured address
        let err = client.register(&form).await.unwrap_err();
        match err {
            ApiError::Validation(fields) => assert!(fields.0.contains_key("confirm_pin")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn verify_email_rejects_empty_token_locally() {
        let client = test_client();
        let err = client.verify_email("   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn empty_token_or_user_is_malformed_and_never_installed() {
        let store = SessionStore::new(Box::new(MemoryStorage::new()));

        let empty_token = LoginResponse {
            token: String::new(),
            user: UserRecord::new("1"),
        };
        let err = validate_login_payload(empty_token).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));

        let empty_user = LoginResponse {
            token: "tok123".into(),
            user: UserRecord::new(""),
        };
        assert!(validate_login_payload(empty_user).is_err());

        // The rejected payloads never reached the store
        assert!(!store.is_authenticated());
    }

    #[test]
    fn well_formed_payload_passes_through() {
        let login = LoginResponse {
            token: "tok123".into(),
            user: UserRecord::new("1"),
        };
        let validated = validate_login_payload(login).unwrap();
        assert_eq!(validated.token, "tok123");
    }

    #[test]
    fn client_creation_succeeds() {
        assert!(AuthClient::new(ApiConfig::new("http://localhost:3000")).is_ok());
    }
}
