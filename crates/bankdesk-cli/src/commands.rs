//! Subcommand handlers.
//!
//! A `Runner` owns the navigation state and the flows. Each handler returns
//! `Ok(false)` when the user saw a notice instead of the view they asked for;
//! `Err` is reserved for terminal I/O failures.

use anyhow::{bail, Context, Result};
use tracing::debug;

use bankdesk_core::models::{AccountType, LoginRequest, SignUpRequest, UserRole};
use bankdesk_core::{App, AuthFlow, FlowOutcome, GuardDecision, Route, Session};

use crate::prompt::Prompter;
use crate::view;

/// Sign-up details taken from the command line
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub username: String,
}

pub struct Runner<P> {
    app: App,
    flow: AuthFlow,
    prompter: P,
}

impl<P: Prompter> Runner<P> {
    pub fn new(app: App, flow: AuthFlow, prompter: P) -> Self {
        Self {
            app,
            flow,
            prompter,
        }
    }

    pub fn session(&self) -> Session {
        self.app.session()
    }

    /// Print the pending notice, if any. Returns true when there was none.
    fn report(&mut self) -> bool {
        match self.app.notice.take() {
            Some(notice) => {
                eprintln!("{}", view::render_notice(&notice));
                false
            }
            None => true,
        }
    }

    /// Follow a flow outcome, rendering whatever view it lands on
    async fn follow(&mut self, outcome: FlowOutcome) -> Result<bool> {
        match self.app.apply_outcome(outcome) {
            Some(decision) => self.render(decision.destination()).await,
            None => Ok(self.report()),
        }
    }

    /// Pass the guard for `route`. Without a session, protected routes
    /// detour through the login prompt and are retried once it succeeds.
    async fn enter(&mut self, route: Route) -> Result<bool> {
        if let GuardDecision::Deny { redirect } = self.app.navigate(route) {
            println!("{}", view::render_redirect(route, redirect));
            if !self.prompt_login(None).await? {
                return Ok(false);
            }
            return Ok(self.app.navigate(route).is_allowed());
        }
        Ok(true)
    }

    async fn visit(&mut self, route: Route) -> Result<bool> {
        if !self.enter(route).await? {
            return Ok(false);
        }
        match route {
            Route::Root | Route::Login => self.login(None).await,
            Route::SignUp => {
                let registration = self.prompt_registration()?;
                self.sign_up(registration).await
            }
            Route::Home | Route::CreateAccount => self.render(route).await,
        }
    }

    /// Print the view for a route the guard has already let through
    async fn render(&mut self, route: Route) -> Result<bool> {
        debug!(route = %route, "Rendering view");
        match route {
            Route::Home => self.render_home().await,
            Route::CreateAccount => {
                println!("{}", view::render_create_account());
                Ok(true)
            }
            Route::Root | Route::Login | Route::SignUp => {
                println!("{}", route);
                Ok(true)
            }
        }
    }

    async fn render_home(&mut self) -> Result<bool> {
        let ticket = self.app.begin_load();
        let result = self.flow.load_user().await;
        self.app.apply_user(ticket, result);

        match self.app.user {
            Some(ref user) => {
                println!("{}", view::render_home(user));
                Ok(true)
            }
            None => Ok(self.report()),
        }
    }

    /// Ask for credentials and log in. Does not render the next view.
    async fn prompt_login(&mut self, username: Option<String>) -> Result<bool> {
        let username = match username {
            Some(username) => username,
            None => self.prompter.ask("Username").context("Failed to read username")?,
        };
        let password = self
            .prompter
            .ask_password("Password")
            .context("Failed to read password")?;

        let outcome = self.flow.login(&LoginRequest::new(username, password)).await;
        match self.app.apply_outcome(outcome) {
            Some(decision) => Ok(decision.is_allowed()),
            None => Ok(self.report()),
        }
    }

    fn prompt_registration(&mut self) -> Result<Registration> {
        let mut ask = |label: &str| {
            self.prompter
                .ask(label)
                .with_context(|| format!("Failed to read {}", label.to_lowercase()))
        };
        Ok(Registration {
            first_name: ask("First name")?,
            last_name: ask("Last name")?,
            email: ask("Email")?,
            phone_number: ask("Phone number")?,
            username: ask("Username")?,
        })
    }

    pub async fn login(&mut self, username: Option<String>) -> Result<bool> {
        self.app.navigate(Route::Login);
        if !self.prompt_login(username).await? {
            return Ok(false);
        }
        self.render(self.app.route).await
    }

    pub async fn sign_up(&mut self, registration: Registration) -> Result<bool> {
        self.app.navigate(Route::SignUp);
        let password = self
            .prompter
            .ask_password("Password")
            .context("Failed to read password")?;

        let request = SignUpRequest {
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            phone_number: registration.phone_number,
            username: registration.username,
            password,
            user_role: UserRole::User,
        };
        let outcome = self.flow.sign_up(&request).await;
        self.follow(outcome).await
    }

    pub async fn home(&mut self) -> Result<bool> {
        self.visit(Route::Home).await
    }

    /// Open an account of the given type, or just show the chooser
    pub async fn create_account(&mut self, account_type: Option<AccountType>) -> Result<bool> {
        let Some(account_type) = account_type else {
            return self.visit(Route::CreateAccount).await;
        };
        if !self.enter(Route::CreateAccount).await? {
            return Ok(false);
        }
        let outcome = self.flow.create_account(account_type).await;
        self.follow(outcome).await
    }

    pub async fn logout(&mut self) -> bool {
        let outcome = self.flow.logout().await;
        if self.app.apply_outcome(outcome).is_some() {
            println!("Logged out.");
            true
        } else {
            self.report()
        }
    }

    pub async fn open(&mut self, path: &str) -> Result<bool> {
        let Some(route) = Route::from_path(path) else {
            bail!(
                "Unknown route '{}'. Known routes: {}",
                path,
                Route::ALL.map(|r| r.path()).join(", ")
            );
        };
        self.visit(route).await
    }

    #[cfg(feature = "token-refresh")]
    pub async fn refresh(&mut self) -> bool {
        let outcome = self.flow.refresh().await;
        if self.app.apply_outcome(outcome).is_some() {
            println!("Session renewed.");
            true
        } else {
            self.report()
        }
    }
}
