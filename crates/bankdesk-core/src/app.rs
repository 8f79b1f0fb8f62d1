//! Navigation state for a bankdesk front-end.
//!
//! `App` tracks which route is on screen, the last notice, and the transient
//! copy of the logged-in user. Every navigation passes through the route guard
//! and bumps an epoch counter; results of calls started under an older epoch
//! are dropped when they arrive.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::auth::{CredentialStore, GuardDecision, Route, RouteGuard, Session};
use crate::flows::{FlowOutcome, Notice, NoticeKind};
use crate::models::LoggedInUser;

/// Marks the navigation a pending load belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    route: Route,
}

impl Ticket {
    pub fn route(&self) -> Route {
        self.route
    }
}

pub struct App {
    store: Arc<dyn CredentialStore>,
    pub route: Route,
    epoch: u64,
    pub notice: Option<Notice>,
    pub user: Option<LoggedInUser>,
}

impl App {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            route: Route::Root,
            epoch: 0,
            notice: None,
            user: None,
        }
    }

    pub fn session(&self) -> Session {
        Session::current(self.store.as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Attempt to show `route`. Protected routes without a session land on
    /// the login entry point instead.
    pub fn navigate(&mut self, route: Route) -> GuardDecision {
        let decision = RouteGuard::evaluate(self.store.as_ref(), route);
        self.route = decision.destination();
        self.epoch += 1;
        self.user = None;
        self.notice = None;
        debug!(requested = %route, shown = %self.route, epoch = self.epoch, "Navigated");
        decision
    }

    /// Start a load for the route currently shown
    pub fn begin_load(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            route: self.route,
        }
    }

    /// Apply a finished user load. Returns false when the load belongs to a
    /// view that has since been left, in which case nothing changes.
    pub fn apply_user(&mut self, ticket: Ticket, result: Result<LoggedInUser, ApiError>) -> bool {
        if ticket.epoch != self.epoch {
            debug!(
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                route = %ticket.route,
                "Dropping late result for a view no longer shown"
            );
            return false;
        }

        match result {
            Ok(user) => self.user = Some(user),
            Err(e) => {
                warn!(error = %e, route = %self.route, "Protected view could not load user");
                self.notice = Some(Notice::new(NoticeKind::LoadFailed).with_detail(e.to_string()));
            }
        }
        true
    }

    /// Follow a flow outcome: navigate, or keep the notice for display.
    pub fn apply_outcome(&mut self, outcome: FlowOutcome) -> Option<GuardDecision> {
        match outcome {
            FlowOutcome::Navigate(route) => Some(self.navigate(route)),
            FlowOutcome::Notice(notice) => {
                self.notice = Some(notice);
                None
            }
        }
    }
}
