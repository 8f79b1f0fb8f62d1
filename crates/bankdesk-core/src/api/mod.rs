//! REST API client module for the banking backend.
//!
//! This module provides the `BankClient` for the login, sign-up, user,
//! account and logout endpoints, and the `RequestGate` that signs protected
//! calls with the stored access token.
//!
//! The backend uses JWT bearer authentication; the client treats the tokens
//! as opaque strings.

pub mod client;
pub mod error;
pub mod gate;

pub use client::{endpoints, BankClient};
pub use error::ApiError;
pub use gate::RequestGate;
