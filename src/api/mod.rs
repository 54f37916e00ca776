//! Typed clients for the QuackWallet HTTP API.
//!
//! Stateless request/response against the backend's `/api` surface:
//! - `auth`: registration, login, email verification, resend-verification
//! - `users`: profile read/update, two-phase text + image edit
//! - `cards`: card CRUD, bearer-authenticated via the session store
//!
//! ## Design
//! - One reqwest client per API client, built with the configured timeout.
//! - Failures arrive as a tagged [`ApiError`] — callers branch on the
//!   variant, never on server message text.
//! - Forms validate locally; a rejected form never reaches the network.

pub mod auth;
pub mod cards;
pub mod error;
pub mod types;
pub mod users;

pub use auth::AuthClient;
pub use cards::CardClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    Card, CardForm, CardPatch, FieldErrors, LoginResponse, ProfileUpdate, RegisterForm,
    ServerMessage, UserPatch, UserRecord,
};
pub use users::{ProfileUpdateOutcome, UserClient};
