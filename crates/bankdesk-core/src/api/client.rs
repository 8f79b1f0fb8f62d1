//! API client for the banking backend.
//!
//! Login and sign-up are plain POSTs. Everything else goes through the
//! [`RequestGate`] so it carries the stored access token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::CredentialStore;
#[cfg(feature = "token-refresh")]
use crate::auth::RefreshToken;
use crate::config::Config;
use crate::models::{
    Account, AccountRequest, AuthenticationResponse, LoggedInUser, LoginRequest, SignUpRequest,
};

use super::gate::{check_response, read_json, RequestGate};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds when no configuration is supplied.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Backend endpoint paths
pub mod endpoints {
    pub const LOGIN: &str = "/api/users/auth/loginUser";
    pub const CREATE_USER: &str = "/api/users/auth/createUser";
    pub const LOGGED_IN_USER: &str = "/api/users/getLoggedInUser";
    pub const LOGOUT: &str = "/api/users/logout";
    pub const CREATE_ACCOUNT: &str = "/api/accounts/createAccount";
    #[cfg(feature = "token-refresh")]
    pub const REFRESH_TOKEN: &str = "/api/users/auth/refreshToken";
}

/// Client for the banking backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct BankClient {
    client: Client,
    gate: RequestGate,
}

impl BankClient {
    /// Create a client with the default timeout
    pub fn new(base_url: &str, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::with_timeout(
            base_url,
            store,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let gate = RequestGate::new(client.clone(), base_url, store);
        Ok(Self { client, gate })
    }

    pub fn from_config(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        Self::with_timeout(&config.api_base_url, store, config.request_timeout())
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// The store the gate reads tokens from
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        self.gate.store()
    }

    /// POST without credentials, for the authentication endpoints
    async fn post_public<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.gate.base_url(), path);
        let response = self.client.post(&url).json(body).send().await?;
        debug!(path = path, status = %response.status(), "Public call completed");
        let response = check_response(response).await?;
        read_json(response, path).await
    }

    // ===== Authentication =====

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthenticationResponse, ApiError> {
        self.post_public(endpoints::LOGIN, request).await
    }

    pub async fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> Result<AuthenticationResponse, ApiError> {
        self.post_public(endpoints::CREATE_USER, request).await
    }

    /// Ask the backend to revoke the current access token.
    /// The response body is ignored; only the status matters.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.gate.get_unit(endpoints::LOGOUT).await
    }

    /// Exchange a refresh token for a new token pair
    #[cfg(feature = "token-refresh")]
    pub async fn refresh_tokens(
        &self,
        refresh: &RefreshToken,
    ) -> Result<AuthenticationResponse, ApiError> {
        let path = endpoints::REFRESH_TOKEN;
        let url = format!("{}{}", self.gate.base_url(), path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(refresh.as_str())
            .send()
            .await?;
        let response = check_response(response).await?;
        read_json(response, path).await
    }

    // ===== Protected data =====

    pub async fn logged_in_user(&self) -> Result<LoggedInUser, ApiError> {
        self.gate.get_json(endpoints::LOGGED_IN_USER).await
    }

    pub async fn create_account(&self, request: &AccountRequest) -> Result<Account, ApiError> {
        self.gate.post_json(endpoints::CREATE_ACCOUNT, request).await
    }
}
