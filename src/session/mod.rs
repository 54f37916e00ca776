//! Session state: the in-memory store and its durable mirror.
//!
//! The store is the single source of truth for the authenticated
//! identity; the mirror only restores it across process restarts. See
//! [`store`] for the mutation contract and [`storage`] for the persisted
//! layout.

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, PersistedSession, SessionStorage};
pub use store::{Session, SessionStore, SubscriptionId};
