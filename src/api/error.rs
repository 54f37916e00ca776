//! Error taxonomy for the API clients.
//!
//! The backend signals some domain failures (notably "email not
//! verified") through message text rather than status codes. That
//! inspection is confined to [`classify`]; everything downstream branches
//! on the [`ApiError`] variant, never on message content.

use crate::api::types::{FieldErrors, ServerMessage};

/// Backend message for a login against an unregistered email.
const MSG_USER_NOT_FOUND: &str = "Usuario no encontrado";
/// Backend message for a wrong password.
const MSG_BAD_PASSWORD: &str = "Contraseña incorrecta";
/// Backend message for a login before email verification.
const MSG_UNVERIFIED: &str = "Email no verificado";

/// Failure modes of a QuackWallet API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network/transport failure; no usable response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The account exists but its email has not been verified yet.
    /// Callers typically offer to resend the verification mail.
    #[error("email not verified")]
    UnverifiedEmail,

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account under that email / no such record.
    #[error("not found")]
    NotFound,

    /// An authenticated call was made without an active session.
    #[error("no active session")]
    NoSession,

    /// Local form validation failed; no request was issued.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The server rejected the request with a human-readable message.
    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The server answered 2xx but the payload was not in the expected
    /// shape (e.g. a login response missing `token` or `user`).
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Map a non-2xx status plus the server's message to a tagged error.
pub(crate) fn classify(status: u16, message: String) -> ApiError {
    match message.as_str() {
        MSG_USER_NOT_FOUND => ApiError::NotFound,
        MSG_BAD_PASSWORD => ApiError::InvalidCredentials,
        MSG_UNVERIFIED => ApiError::UnverifiedEmail,
        _ => ApiError::Rejected { status, message },
    }
}

/// Consume a failed response and classify it. Bodies that are not the
/// usual `{"message": ...}` shape are passed through verbatim.
pub(crate) async fn error_from_response(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ServerMessage>(&body) {
        Ok(parsed) if !parsed.message.is_empty() => parsed.message,
        _ => body,
    };
    classify(status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_email_maps_to_not_found() {
        let err = classify(400, "Usuario no encontrado".into());
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn wrong_password_maps_to_invalid_credentials() {
        let err = classify(400, "Contraseña incorrecta".into());
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[test]
    fn unverified_email_is_a_distinct_variant() {
        // The backend signals this through message text; callers must be
        // able to branch on structure instead
        let err = classify(403, "Email no verificado".into());
        assert!(matches!(err, ApiError::UnverifiedEmail));
    }

    #[test]
    fn other_messages_map_to_rejected_with_status() {
        let err = classify(422, "Teléfono ya registrado".into());
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Teléfono ya registrado");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn validation_error_carries_field_errors() {
        let mut fields = FieldErrors::default();
        fields.insert("pin", "Los PINs no coinciden");

        let err = ApiError::from(fields);
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(err.to_string().contains("pin"));
    }
}
