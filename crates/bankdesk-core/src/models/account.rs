use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "CURRENT")]
    Current,
    #[serde(rename = "SAVINGS")]
    Savings,
}

impl AccountType {
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountType::Current => "Current",
            AccountType::Savings => "Savings",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(AccountType::Current),
            "savings" => Ok(AccountType::Savings),
            other => Err(format!(
                "unknown account type '{}', expected 'current' or 'savings'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "accountNumber", default)]
    pub account_number: String,
    #[serde(rename = "accountType")]
    pub account_type: AccountType,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRequest {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "accountType")]
    pub account_type: AccountType,
}
