//! Authentication and account flows.
//!
//! Each flow makes its backend call(s), updates the credential store where the
//! flow calls for it, and reports either the next route or a user-facing
//! notice. Failures never mutate the store.

use std::fmt;

use tracing::{error, info, warn};

use crate::api::{ApiError, BankClient};
use crate::auth::{CredentialStore, Route};
use crate::models::{
    AccountRequest, AccountType, AuthenticationResponse, LoggedInUser, LoginRequest, SignUpRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    LoginFailed,
    SignUpFailed,
    LogoutFailed,
    AccountCreationFailed,
    LoadFailed,
    #[cfg(feature = "token-refresh")]
    RefreshFailed,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::LoginFailed => "Login failed. Please try again!",
            NoticeKind::SignUpFailed => "Registration failed. Please try again!",
            NoticeKind::LogoutFailed => "Error logging out! Try again!",
            NoticeKind::AccountCreationFailed => "Account creation failed. Please try again!",
            NoticeKind::LoadFailed => "Could not load your accounts.",
            #[cfg(feature = "token-refresh")]
            NoticeKind::RefreshFailed => "Could not renew your session. Please log in again.",
        }
    }
}

/// A user-visible failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail {
            Some(ref detail) => write!(f, "{} ({})", self.message, detail),
            None => f.write_str(&self.message),
        }
    }
}

/// What the caller should do after a flow finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Navigate(Route),
    Notice(Notice),
}

impl FlowOutcome {
    fn failed(kind: NoticeKind, detail: impl Into<String>) -> Self {
        FlowOutcome::Notice(Notice::new(kind).with_detail(detail))
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            FlowOutcome::Notice(notice) => Some(notice),
            FlowOutcome::Navigate(_) => None,
        }
    }
}

/// Orchestrates the authentication flows over one client and its store.
#[derive(Clone)]
pub struct AuthFlow {
    client: BankClient,
}

impl AuthFlow {
    pub fn new(client: BankClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BankClient {
        &self.client
    }

    fn store(&self) -> &dyn CredentialStore {
        self.client.store().as_ref()
    }

    /// Persist the returned tokens and move on to `next`.
    fn establish(
        &self,
        response: AuthenticationResponse,
        failure: NoticeKind,
        next: Route,
    ) -> FlowOutcome {
        if let Some(ref message) = response.message {
            info!(message = %message, "Backend accepted credentials");
        }
        let credentials = response.into_credentials();
        match self.store().save(&credentials.access, &credentials.refresh) {
            Ok(()) => FlowOutcome::Navigate(next),
            Err(e) => {
                error!(error = %e, "Failed to save credentials");
                FlowOutcome::failed(failure, e.to_string())
            }
        }
    }

    /// Log in. Success stores the tokens and heads to `/home`.
    pub async fn login(&self, request: &LoginRequest) -> FlowOutcome {
        if let Some(field) = request.missing_field() {
            return FlowOutcome::failed(NoticeKind::LoginFailed, format!("{} is required", field));
        }

        match self.client.login(request).await {
            Ok(response) => {
                info!(username = %request.username, "Login successful");
                self.establish(response, NoticeKind::LoginFailed, Route::Home)
            }
            Err(e) => {
                error!(error = %e, username = %request.username, "Login failed");
                FlowOutcome::failed(NoticeKind::LoginFailed, e.to_string())
            }
        }
    }

    /// Register. Success stores the tokens and heads to `/createAccount`.
    pub async fn sign_up(&self, request: &SignUpRequest) -> FlowOutcome {
        if let Some(field) = request.missing_field() {
            return FlowOutcome::failed(NoticeKind::SignUpFailed, format!("{} is required", field));
        }

        match self.client.sign_up(request).await {
            Ok(response) => {
                info!(username = %request.username, "Registration successful");
                self.establish(response, NoticeKind::SignUpFailed, Route::CreateAccount)
            }
            Err(e) => {
                error!(error = %e, username = %request.username, "Registration failed");
                FlowOutcome::failed(NoticeKind::SignUpFailed, e.to_string())
            }
        }
    }

    /// Log out on the backend, then forget the tokens.
    ///
    /// The store is cleared only once the backend confirms; a failed call
    /// leaves the session exactly as it was.
    pub async fn logout(&self) -> FlowOutcome {
        if let Err(e) = self.client.logout().await {
            error!(error = %e, "Logout failed, keeping session");
            return FlowOutcome::failed(NoticeKind::LogoutFailed, e.to_string());
        }

        match self.store().clear() {
            Ok(()) => {
                info!("Logged out");
                FlowOutcome::Navigate(Route::ENTRY_POINT)
            }
            Err(e) => {
                error!(error = %e, "Failed to clear credentials after logout");
                FlowOutcome::failed(NoticeKind::LogoutFailed, e.to_string())
            }
        }
    }

    /// Fetch the current user for a protected view.
    /// Errors are reported to the caller; the store is left alone even on 401.
    pub async fn load_user(&self) -> Result<LoggedInUser, ApiError> {
        self.client.logged_in_user().await.inspect_err(|e| {
            warn!(error = %e, auth_rejected = e.is_auth_rejection(), "Failed to load user");
        })
    }

    /// Open a new account for the current user, then head back to `/home`.
    pub async fn create_account(&self, account_type: AccountType) -> FlowOutcome {
        let user = match self.load_user().await {
            Ok(user) => user,
            Err(e) => return FlowOutcome::failed(NoticeKind::AccountCreationFailed, e.to_string()),
        };

        let request = AccountRequest {
            user_id: user.id,
            account_type,
        };
        match self.client.create_account(&request).await {
            Ok(account) => {
                info!(
                    account_number = %account.account_number,
                    account_type = %account.account_type,
                    "Account created"
                );
                FlowOutcome::Navigate(Route::Home)
            }
            Err(e) => {
                error!(error = %e, "Account creation failed");
                FlowOutcome::failed(NoticeKind::AccountCreationFailed, e.to_string())
            }
        }
    }

    /// Trade the stored refresh token for a new pair.
    /// Only ever called on request; protected calls never refresh on their own.
    #[cfg(feature = "token-refresh")]
    pub async fn refresh(&self) -> FlowOutcome {
        let refresh = match self.store().refresh_token() {
            Ok(Some(token)) if !token.as_str().is_empty() => token,
            Ok(_) => {
                return FlowOutcome::failed(NoticeKind::RefreshFailed, "no refresh token stored")
            }
            Err(e) => return FlowOutcome::failed(NoticeKind::RefreshFailed, e.to_string()),
        };

        match self.client.refresh_tokens(&refresh).await {
            Ok(response) => {
                info!("Session renewed");
                self.establish(response, NoticeKind::RefreshFailed, Route::Home)
            }
            Err(e) => {
                error!(error = %e, "Token refresh failed");
                FlowOutcome::failed(NoticeKind::RefreshFailed, e.to_string())
            }
        }
    }
}
