//! Utility functions for display formatting.

pub mod format;

pub use format::{format_balance, format_phone, mask_account_number};
