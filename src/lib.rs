//! Client library for the QuackWallet personal-finance API.
//!
//! Provides:
//! - A [`SessionStore`]: the single source of truth for the authenticated
//!   identity, mirrored to durable storage and restored at startup
//! - Typed API clients for registration/login/verification
//!   ([`AuthClient`]), profile management ([`UserClient`]) and card CRUD
//!   ([`CardClient`])
//! - Local form validation, so malformed input never reaches the network
//!
//! All business logic (password hashing, token issuance, persistence)
//! lives in the remote backend; this crate holds client-side session
//! state and the request/response contract. Rendering and routing are
//! the embedder's concern.
//!
//! ```no_run
//! use quackwallet::{ApiConfig, AuthClient, MemoryStorage, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ApiConfig::new("http://localhost:3000");
//! let session = Arc::new(SessionStore::new(Box::new(MemoryStorage::new())));
//!
//! let auth = AuthClient::new(config)?;
//! let login = auth.login("ana@example.com", "secret1").await?;
//! session.login(login.user, login.token);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod session;

pub use api::{
    ApiError, ApiResult, AuthClient, Card, CardClient, CardForm, CardPatch, FieldErrors,
    LoginResponse, ProfileUpdate, ProfileUpdateOutcome, RegisterForm, ServerMessage, UserClient,
    UserPatch, UserRecord,
};
pub use config::ApiConfig;
pub use session::{
    FileStorage, MemoryStorage, PersistedSession, Session, SessionStore, SessionStorage,
    SubscriptionId,
};
