mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use bankdesk_core::api::endpoints;
use bankdesk_core::auth::{AccessToken, MemoryStore, RefreshToken, StoreError};
use bankdesk_core::models::{AccountType, LoginRequest, SignUpRequest, UserRole};
use bankdesk_core::{
    ApiError, App, AuthFlow, BankClient, CredentialStore, FlowOutcome, GuardDecision, NoticeKind,
    Route,
};

use common::FakeBackend;

fn flow_for(backend: &FakeBackend, store: &MemoryStore) -> AuthFlow {
    let client = BankClient::new(&backend.base_url, Arc::new(store.clone())).unwrap();
    AuthFlow::new(client)
}

fn stored(store: &MemoryStore) -> (Option<String>, Option<String>) {
    (
        store.access_token().unwrap().map(|t| t.as_str().to_string()),
        store.refresh_token().unwrap().map(|t| t.as_str().to_string()),
    )
}

fn sign_up_request() -> SignUpRequest {
    SignUpRequest {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone_number: "5551234567".into(),
        username: "ada".into(),
        password: "hunter2".into(),
        user_role: UserRole::User,
    }
}

#[tokio::test]
async fn test_login_success_stores_exact_tokens() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::new();
    let flow = flow_for(&backend, &store);

    let outcome = flow.login(&LoginRequest::new("ada", "hunter2")).await;

    assert_eq!(outcome, FlowOutcome::Navigate(Route::Home));
    assert_eq!(stored(&store), (Some("X".into()), Some("Y".into())));

    let calls = backend.calls_to(endpoints::LOGIN);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].authorization.is_none());
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["username"], "ada");
    assert_eq!(body["password"], "hunter2");
}

#[tokio::test]
async fn test_login_overwrites_previous_session() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("old-access", "old-refresh");
    let flow = flow_for(&backend, &store);

    flow.login(&LoginRequest::new("ada", "hunter2")).await;
    assert_eq!(stored(&store), (Some("X".into()), Some("Y".into())));
}

#[tokio::test]
async fn test_login_rejection_leaves_store_untouched() {
    let backend = FakeBackend::start().await;
    backend.respond_with(endpoints::LOGIN, StatusCode::BAD_REQUEST);

    for store in [MemoryStore::new(), MemoryStore::with_tokens("old", "older")] {
        let before = stored(&store);
        let flow = flow_for(&backend, &store);

        let outcome = flow.login(&LoginRequest::new("ada", "wrong")).await;

        let notice = outcome.notice().expect("failure notice");
        assert_eq!(notice.kind, NoticeKind::LoginFailed);
        assert_eq!(notice.message, "Login failed. Please try again!");
        assert_eq!(stored(&store), before);
    }
}

/// Reads like an empty store, refuses every write
struct ReadOnlyStore;

impl CredentialStore for ReadOnlyStore {
    fn save(&self, _: &AccessToken, _: &RefreshToken) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }

    fn access_token(&self) -> Result<Option<AccessToken>, StoreError> {
        Ok(None)
    }

    fn refresh_token(&self) -> Result<Option<RefreshToken>, StoreError> {
        Ok(None)
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_login_with_unwritable_store_does_not_establish_session() {
    let backend = FakeBackend::start().await;
    let store: Arc<dyn CredentialStore> = Arc::new(ReadOnlyStore);
    let flow = AuthFlow::new(BankClient::new(&backend.base_url, store.clone()).unwrap());
    let mut app = App::new(store);

    let outcome = flow.login(&LoginRequest::new("ada", "hunter2")).await;

    let notice = outcome.notice().expect("failure notice");
    assert_eq!(notice.kind, NoticeKind::LoginFailed);
    assert!(app.apply_outcome(outcome).is_none());
    assert!(!app.is_authenticated());
    assert!(!app.navigate(Route::Home).is_allowed());
}

#[tokio::test]
async fn test_sign_up_stores_tokens_and_heads_to_create_account() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::new();
    let flow = flow_for(&backend, &store);

    let outcome = flow.sign_up(&sign_up_request()).await;

    assert_eq!(outcome, FlowOutcome::Navigate(Route::CreateAccount));
    assert_eq!(stored(&store), (Some("S1".into()), Some("S2".into())));

    let body = backend.calls_to(endpoints::CREATE_USER)[0].body.clone().unwrap();
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["userRole"], "USER");
}

#[tokio::test]
async fn test_sign_up_rejection_raises_notice() {
    let backend = FakeBackend::start().await;
    backend.respond_with(endpoints::CREATE_USER, StatusCode::BAD_REQUEST);
    let store = MemoryStore::new();
    let flow = flow_for(&backend, &store);

    let outcome = flow.sign_up(&sign_up_request()).await;

    assert_eq!(outcome.notice().unwrap().kind, NoticeKind::SignUpFailed);
    assert_eq!(stored(&store), (None, None));
}

#[tokio::test]
async fn test_protected_call_carries_bearer_token() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let user = flow.load_user().await.unwrap();
    assert_eq!(user.id, 42);
    assert_eq!(user.account_list.len(), 1);

    let calls = backend.calls_to(endpoints::LOGGED_IN_USER);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer tok123"));
}

#[tokio::test]
async fn test_protected_call_without_token_is_sent_bare_and_rejected() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::new();
    let flow = flow_for(&backend, &store);

    let err = flow.load_user().await.unwrap_err();
    assert!(err.is_auth_rejection());

    let calls = backend.calls_to(endpoints::LOGGED_IN_USER);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].authorization.is_none());
}

#[tokio::test]
async fn test_unauthorized_does_not_log_out() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("expired", "ref");
    let flow = flow_for(&backend, &store);

    let err = flow.load_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    // Still "logged in" locally until an explicit logout
    assert_eq!(stored(&store).0.as_deref(), Some("expired"));
    let mut app = App::new(Arc::new(store.clone()));
    assert!(app.navigate(Route::Home).is_allowed());

    // No retry happened
    assert_eq!(backend.calls_to(endpoints::LOGGED_IN_USER).len(), 1);
}

#[tokio::test]
async fn test_token_is_read_at_call_time() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("first", "r");
    let flow = flow_for(&backend, &store);

    flow.load_user().await.unwrap();
    store
        .save(&AccessToken::new("second"), &RefreshToken::new("r"))
        .unwrap();
    flow.load_user().await.unwrap();

    let auth: Vec<_> = backend
        .calls_to(endpoints::LOGGED_IN_USER)
        .into_iter()
        .map(|c| c.authorization)
        .collect();
    assert_eq!(
        auth,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn test_logout_success_clears_store() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.logout().await;

    assert_eq!(outcome, FlowOutcome::Navigate(Route::Login));
    assert_eq!(stored(&store), (None, None));
    let calls = backend.calls_to(endpoints::LOGOUT);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer tok123"));
}

#[tokio::test]
async fn test_logout_failure_keeps_session() {
    let backend = FakeBackend::start().await;
    backend.respond_with(endpoints::LOGOUT, StatusCode::INTERNAL_SERVER_ERROR);
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.logout().await;

    let notice = outcome.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::LogoutFailed);
    assert_eq!(notice.message, "Error logging out! Try again!");
    assert_eq!(
        stored(&store),
        (Some("tok123".into()), Some("ref456".into()))
    );
}

#[tokio::test]
async fn test_create_account_posts_user_id_and_type() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.create_account(AccountType::Savings).await;

    assert_eq!(outcome, FlowOutcome::Navigate(Route::Home));
    let calls = backend.calls_to(endpoints::CREATE_ACCOUNT);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer tok123"));
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["userId"], 42);
    assert_eq!(body["accountType"], "SAVINGS");
}

#[tokio::test]
async fn test_create_account_failure_raises_notice() {
    let backend = FakeBackend::start().await;
    backend.respond_with(endpoints::CREATE_ACCOUNT, StatusCode::BAD_REQUEST);
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.create_account(AccountType::Current).await;

    assert_eq!(
        outcome.notice().unwrap().kind,
        NoticeKind::AccountCreationFailed
    );
    assert!(store.access_token().unwrap().is_some());
}

#[tokio::test]
async fn test_create_account_without_user_does_not_post() {
    let backend = FakeBackend::start().await;
    backend.respond_with(endpoints::LOGGED_IN_USER, StatusCode::BAD_REQUEST);
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.create_account(AccountType::Current).await;

    assert_eq!(
        outcome.notice().unwrap().kind,
        NoticeKind::AccountCreationFailed
    );
    assert!(backend.calls_to(endpoints::CREATE_ACCOUNT).is_empty());
}

#[tokio::test]
async fn test_full_session_journey() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::new();
    let flow = flow_for(&backend, &store);
    let mut app = App::new(Arc::new(store.clone()));

    // Fresh store: /home bounces to /login
    assert_eq!(
        app.navigate(Route::Home),
        GuardDecision::Deny {
            redirect: Route::Login
        }
    );

    // Log in and follow the outcome to /home
    let outcome = flow.login(&LoginRequest::new("ada", "hunter2")).await;
    let decision = app.apply_outcome(outcome).unwrap();
    assert_eq!(decision, GuardDecision::Allow(Route::Home));

    // Mount effect loads the user for the view
    let ticket = app.begin_load();
    let result = flow.load_user().await;
    assert!(app.apply_user(ticket, result));
    assert_eq!(app.user.as_ref().unwrap().display_name(), "Ada");

    // Log out and the guard closes again
    let outcome = flow.logout().await;
    assert_eq!(
        app.apply_outcome(outcome),
        Some(GuardDecision::Allow(Route::Login))
    );
    assert!(!app.navigate(Route::Home).is_allowed());
}

#[tokio::test]
async fn test_late_load_after_leaving_view_is_ignored() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);
    let mut app = App::new(Arc::new(store.clone()));

    app.navigate(Route::Home);
    let ticket = app.begin_load();
    let pending = flow.load_user();

    // User moves on before the call resolves
    app.navigate(Route::CreateAccount);
    let result = pending.await;

    assert!(result.is_ok());
    assert!(!app.apply_user(ticket, result));
    assert!(app.user.is_none());
    assert!(app.notice.is_none());
}

#[cfg(feature = "token-refresh")]
#[tokio::test]
async fn test_refresh_rotates_tokens_with_refresh_bearer() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.refresh().await;

    assert_eq!(outcome, FlowOutcome::Navigate(Route::Home));
    assert_eq!(stored(&store), (Some("R1".into()), Some("R2".into())));
    let calls = backend.calls_to("/api/users/auth/refreshToken");
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer ref456"));
}

#[cfg(feature = "token-refresh")]
#[tokio::test]
async fn test_refresh_failure_keeps_tokens() {
    let backend = FakeBackend::start().await;
    backend.respond_with("/api/users/auth/refreshToken", StatusCode::BAD_REQUEST);
    let store = MemoryStore::with_tokens("tok123", "ref456");
    let flow = flow_for(&backend, &store);

    let outcome = flow.refresh().await;

    assert_eq!(outcome.notice().unwrap().kind, NoticeKind::RefreshFailed);
    assert_eq!(
        stored(&store),
        (Some("tok123".into()), Some("ref456".into()))
    );
}
