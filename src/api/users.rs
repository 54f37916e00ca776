//! Profile read/update calls, including the two-phase text + image edit.
//!
//! A profile edit is two independent requests: text fields first, then
//! the image as a separate multipart upload. The phases fail
//! independently by design — a failed upload must never roll back or
//! block the text update. [`ProfileUpdateOutcome`] makes that contract
//! explicit instead of leaving it to caller convention.

use crate::api::error::{error_from_response, ApiError, ApiResult};
use crate::api::types::{ProfileUpdate, UserRecord};
use crate::config::ApiConfig;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

/// Multipart field name the backend expects for the profile image.
const IMAGE_PART: &str = "imagen";

/// Result of a two-phase profile edit.
#[derive(Debug)]
pub enum ProfileUpdateOutcome {
    /// Both phases succeeded; the record reflects text and image.
    Applied(UserRecord),
    /// Text fields were applied but the image upload failed. The text
    /// update stands; the caller may retry the image alone.
    PartiallyApplied {
        profile: UserRecord,
        image_error: ApiError,
    },
}

/// Client for the profile endpoints. Attaches the bearer token from the
/// session store on every call.
pub struct UserClient {
    config: ApiConfig,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl UserClient {
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

    fn profile_url(&self, user_id: &str) -> String {
        self.config.endpoint(&format!("/users/{user_id}/profile"))
    }

    fn bearer(&self) -> ApiResult<String> {
        self.session
            .token()
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::NoSession)
    }

    /// Fetch the complete profile record.
    pub async fn get_profile(&self, user_id: &str) -> ApiResult<UserRecord> {
        let resp = self
            .http
            .get(self.profile_url(user_id))
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

    /// Update the text fields of a profile. Returns the updated record.
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> ApiResult<UserRecord> {
        let resp = self
            .http
            .put(self.profile_url(user_id))
            .header("Authorization", self.bearer()?)
            .json(update)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Replace the profile image via multipart upload. Returns the
    /// updated record.
    pub async fn update_profile_image(
        &self,
        user_id: &str,
        filename: &str,
        image: Vec<u8>,
    ) -> ApiResult<UserRecord> {
        let part = reqwest::multipart::Part::bytes(image).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part(IMAGE_PART, part);

        let resp = self
            .http
            .put(format!("{}/image", self.profile_url(user_id)))
            .header("Authorization", self.bearer()?)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Two-phase profile edit: text fields, then image.
    ///
    /// Phase 1 failure aborts the whole operation. Phase 2 failure is
    /// reported through [`ProfileUpdateOutcome::PartiallyApplied`] and
    /// does not roll back phase 1.
    pub async fn update_profile_with_image(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
        filename: &str,
        image: Vec<u8>,
    ) -> ApiResult<ProfileUpdateOutcome> {
        let profile = self.update_profile(user_id, update).await?;

        match self.update_profile_image(user_id, filename, image).await {
            Ok(with_image) => Ok(ProfileUpdateOutcome::Applied(with_image)),
            Err(image_error) => {
                tracing::warn!("Profile image upload failed after text update: {image_error}");
                Ok(ProfileUpdateOutcome::PartiallyApplied {
                    profile,
                    image_error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    fn test_session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new(Box::new(MemoryStorage::new())))
    }

    fn test_client(session: Arc<SessionStore>) -> UserClient {
        UserClient::new(ApiConfig::new("http://localhost:3000"), session).unwrap()
    }

    #[test]
    fn profile_url_construction() {
        let client = test_client(test_session());
        assert_eq!(
            client.profile_url("7"),
            "http://localhost:3000/api/users/7/profile"
        );
        assert_eq!(
            format!("{}/image", client.profile_url("7")),
            "http://localhost:3000/api/users/7/profile/image"
        );
    }

    #[test]
    fn bearer_requires_active_session() {
        let session = test_session();
        let client = test_client(Arc::clone(&session));
        assert!(matches!(client.bearer(), Err(ApiError::NoSession)));

        session.login(crate::api::types::UserRecord::new("7"), "tok123");
        assert_eq!(client.bearer().unwrap(), "Bearer tok123");
    }

    #[tokio::test]
    async fn get_profile_without_session_fails_before_any_request() {
        let client = test_client(test_session());
        let err = client.get_profile("7").await.unwrap_err();
        assert!(matches!(err, ApiError::NoSession));
    }

    #[test]
    fn profile_update_serializes_backend_names() {
        let update = ProfileUpdate {
            nombre: "Ana".into(),
            correo: "ana@x.com".into(),
            telefono: "3001234567".into(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["Nombre_Usuario"], "Ana");
        assert_eq!(json["Correo"], "ana@x.com");
        assert_eq!(json["Telefono"], "3001234567");
    }
}
