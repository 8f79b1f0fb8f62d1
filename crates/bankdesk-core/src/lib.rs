//! bankdesk core - session handling and API access for the bankdesk banking backend.
//!
//! The crate is organised leaf first:
//! - `auth`: credential storage, the session query and the route guard
//! - `api`: the authenticated request gate and the typed backend client
//! - `flows`: login, sign-up, logout and account orchestration
//! - `app`: navigation state that applies flow results
//!
//! Everything that touches persisted credentials goes through the
//! [`auth::CredentialStore`] trait, so callers can swap the on-disk store for
//! [`auth::MemoryStore`] in tests.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod flows;
pub mod models;
pub mod utils;

pub use api::{ApiError, BankClient, RequestGate};
pub use app::{App, Ticket};
pub use auth::{
    AccessToken, CredentialStore, Credentials, GuardDecision, RefreshToken, Route, RouteGuard,
    Session, StoreError,
};
pub use config::{Config, StorageBackend};
pub use flows::{AuthFlow, FlowOutcome, Notice, NoticeKind};
