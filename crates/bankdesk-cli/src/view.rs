//! Plain-text views.

use std::fmt::Write;

use bankdesk_core::models::LoggedInUser;
use bankdesk_core::utils::{format_balance, format_phone, mask_account_number};
use bankdesk_core::{Config, Notice, Route, Session};

pub fn render_home(user: &LoggedInUser) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome, {}", user.display_name());
    if let Some(ref phone) = user.phone_number {
        let _ = writeln!(out, "Phone: {}", format_phone(phone));
    }

    if user.account_list.is_empty() {
        let _ = write!(
            out,
            "No accounts yet. Open one with `bankdesk create-account --type current`."
        );
        return out;
    }

    let _ = writeln!(out);
    for account in &user.account_list {
        let _ = writeln!(
            out,
            "  {:<10} {:>12} {:>15}",
            account.account_type.display_name(),
            mask_account_number(&account.account_number),
            format_balance(account.balance)
        );
    }
    let _ = write!(
        out,
        "  {:<10} {:>12} {:>15}",
        "Total",
        "",
        format_balance(user.total_balance())
    );
    out
}

pub fn render_create_account() -> String {
    "Choose an account type: bankdesk create-account --type current|savings".to_string()
}

pub fn render_notice(notice: &Notice) -> String {
    format!("error: {}", notice)
}

pub fn render_redirect(requested: Route, shown: Route) -> String {
    format!("{} requires a session, redirecting to {}", requested, shown)
}

pub fn render_status(config: &Config, session: &Session) -> String {
    let state = if session.is_authenticated() {
        "logged in"
    } else {
        "logged out"
    };
    format!(
        "Session: {}\nProfile: {}\nStorage: {}\nBackend: {}",
        state, config.profile, config.storage, config.api_base_url
    )
}
