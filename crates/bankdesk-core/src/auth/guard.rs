use std::fmt;

use tracing::debug;

use super::session::Session;
use super::store::CredentialStore;

/// Navigable client destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`, renders the login view
    Root,
    Login,
    SignUp,
    Home,
    CreateAccount,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Root,
        Route::Login,
        Route::SignUp,
        Route::Home,
        Route::CreateAccount,
    ];

    /// Where unauthenticated visitors are sent.
    pub const ENTRY_POINT: Route = Route::Login;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::SignUp => "/signUp",
            Route::Home => "/home",
            Route::CreateAccount => "/createAccount",
        }
    }

    /// Parse an exact route path. Paths are case sensitive.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home | Route::CreateAccount)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of one navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested route
    Allow(Route),
    /// Send the visitor to the authentication entry point instead
    Deny { redirect: Route },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow(_))
    }

    /// The route that ends up rendered
    pub fn destination(&self) -> Route {
        match *self {
            GuardDecision::Allow(route) => route,
            GuardDecision::Deny { redirect } => redirect,
        }
    }
}

/// Stateless gate in front of protected routes.
///
/// The decision reads only the credential store at evaluation time. A present
/// token is enough; no request is made to check it.
pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(store: &dyn CredentialStore, route: Route) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::Allow(route);
        }

        if Session::current(store).is_authenticated() {
            GuardDecision::Allow(route)
        } else {
            debug!(route = %route, "No session, redirecting to login");
            GuardDecision::Deny {
                redirect: Route::ENTRY_POINT,
            }
        }
    }
}
