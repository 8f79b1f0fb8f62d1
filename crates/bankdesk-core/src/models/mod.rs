//! Wire models for the banking backend.
//!
//! - `LoginRequest`, `SignUpRequest`, `AuthenticationResponse`: authentication bodies
//! - `LoggedInUser`: the profile returned for the current token
//! - `Account`, `AccountType`, `AccountRequest`: account records and creation
//!
//! These are transient copies; nothing here is persisted by the client.

pub mod account;
pub mod auth;
pub mod user;

pub use account::{Account, AccountRequest, AccountType};
pub use auth::{AuthenticationResponse, LoginRequest, SignUpRequest, UserRole};
pub use user::LoggedInUser;
