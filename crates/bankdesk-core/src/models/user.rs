use serde::{Deserialize, Serialize};

use super::account::Account;

/// Profile of the user the current access token belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedInUser {
    pub id: i64,
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "accountList", default)]
    pub account_list: Vec<Account>,
}

impl LoggedInUser {
    /// Name used in the greeting, falling back to the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), _) if !first.is_empty() => first.clone(),
            (_, Some(last)) if !last.is_empty() => last.clone(),
            _ => self.username.clone().unwrap_or_default(),
        }
    }

    pub fn total_balance(&self) -> f64 {
        self.account_list.iter().map(|a| a.balance).sum()
    }
}
