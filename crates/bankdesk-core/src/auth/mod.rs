//! Authentication module for managing the local session.
//!
//! This module provides:
//! - `CredentialStore`: the persistence seam for access and refresh tokens,
//!   with in-memory, file and OS keychain implementations
//! - `Session`: the presence-based session query
//! - `RouteGuard`: the allow/deny decision for protected routes
//!
//! A session exists exactly when the store holds a non-empty access token.
//! Nothing here talks to the backend; whether the token is still accepted is
//! only discovered by the first protected request.

pub mod credentials;
pub mod file;
pub mod guard;
pub mod session;
pub mod store;

pub use credentials::KeyringStore;
pub use file::FileStore;
pub use guard::{GuardDecision, Route, RouteGuard};
pub use session::{is_authenticated, AccessToken, Credentials, RefreshToken, Session};
pub use store::{CredentialStore, MemoryStore, StoreError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
