//! In-memory session store with a durable mirror.
//!
//! Single source of truth for "is a user authenticated, and as whom".
//! The in-memory copy is authoritative; the [`SessionStorage`] mirror is a
//! side effect of mutations, read back only at construction and on
//! explicit [`SessionStore::resync`].
//!
//! ## Design
//! - `user` and `token` are set and cleared together. A mirror holding
//!   only one of the two restores as "no session".
//! - Mutations are atomic from an observer's point of view: both fields
//!   swap under one lock, and subscribers are notified synchronously
//!   after the commit with the new snapshot.
//! - Last writer wins. There is no versioning; a delayed `login` landing
//!   after a `logout` simply becomes the current state.
//! - Mirror write failures are logged, not raised: the store's own
//!   operations are total over well-formed input.
//!
//! Constructed explicitly and shared behind `Arc` — no ambient singleton,
//! so tests and embedders can run isolated instances.

use crate::api::types::{UserPatch, UserRecord};
use crate::session::storage::SessionStorage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The current authenticated identity: user record plus bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserRecord,
    pub token: String,
}

/// Handle returned by [`SessionStore::subscribe`]; pass it back to
/// [`SessionStore::unsubscribe`] when the consumer goes away, which is
/// also the guard against deliveries to torn-down consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SubscriberFn = dyn Fn(Option<&Session>) + Send + Sync;

/// Session state container shared by everything that gates on
/// authentication or displays identity.
pub struct SessionStore {
    current: Mutex<Option<Session>>,
    storage: Box<dyn SessionStorage>,
    subscribers: Mutex<Vec<(SubscriptionId, Arc<SubscriberFn>)>>,
    next_subscription: AtomicU64,
}

impl SessionStore {
    /// Build a store over the given mirror, restoring a prior session if
    /// the mirror holds both keys and the user record parses. No local
    /// token validation happens here — a stale token is only discovered
    /// when the remote API rejects it.
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        let current = Self::restore(storage.as_ref());
        Self {
            current: Mutex::new(current),
            storage,
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    fn restore(storage: &dyn SessionStorage) -> Option<Session> {
        let persisted = storage.load();
        let (Some(user_json), Some(token)) = (persisted.user, persisted.token) else {
            return None;
        };
        match serde_json::from_str::<UserRecord>(&user_json) {
            Ok(user) => Some(Session { user, token }),
            Err(err) => {
                tracing::warn!("Discarding unreadable persisted session: {err}");
                None
            }
        }
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Install a new session, replacing any current one, and persist it.
    pub fn login(&self, user: UserRecord, token: impl Into<String>) {
        let session = Session {
            user,
            token: token.into(),
        };

        {
            let mut current = self.current.lock();
            self.persist(&session);
            *current = Some(session);
        }

        self.notify();
    }

    /// Clear the session and both mirror keys. Idempotent.
    pub fn logout(&self) {
        {
            let mut current = self.current.lock();
            if let Err(err) = self.storage.clear() {
                tracing::warn!("Failed to clear session mirror: {err}");
            }
            *current = None;
        }

        self.notify();
    }

    /// Shallow-merge `patch` into the current user record and persist the
    /// result. The token is untouched. Without an active session this is
    /// a no-op.
    pub fn update_user(&self, patch: UserPatch) {
        {
            let mut current = self.current.lock();
            let Some(session) = current.as_mut() else {
                tracing::warn!("update_user called without an active session; ignoring");
                return;
            };
            session.user.merge(patch);
            self.persist(session);
        }

        self.notify();
    }

    /// Re-read the mirror and adopt its contents, e.g. after another
    /// process wrote it. Subscribers are notified only on change.
    pub fn resync(&self) {
        let changed = {
            let mut current = self.current.lock();
            let restored = Self::restore(self.storage.as_ref());
            let changed = *current != restored;
            *current = restored;
            changed
        };

        if changed {
            self.notify();
        }
    }

    fn persist(&self, session: &Session) {
        let user_json = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("Failed to serialize user for session mirror: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.store(&user_json, &session.token) {
            tracing::warn!("Failed to write session mirror: {err}");
        }
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Clone of the current session, if any.
    pub fn snapshot(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    /// Clone of the current user record, if any.
    pub fn user(&self) -> Option<UserRecord> {
        self.current.lock().as_ref().map(|s| s.user.clone())
    }

    /// The current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.current.lock().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.lock().is_some()
    }

    // ── Subscriptions ───────────────────────────────────────────

    /// Register a callback invoked synchronously after every committed
    /// mutation, with the new snapshot (`None` after logout).
    ///
    /// No locks are held during delivery, so a callback may mutate the
    /// store (e.g. a route guard logging out) or manage subscriptions.
    /// The resulting notification runs nested, before the outer delivery
    /// round finishes with its now-stale snapshot.
    pub fn subscribe(
        &self,
        callback: impl Fn(Option<&Session>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        // Deliver outside the registry lock so callbacks can call back
        // into the store without deadlocking
        let subscribers: Vec<Arc<SubscriberFn>> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(snapshot.as_ref());
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
