//! Interactive input.

use std::io::{self, BufRead, Write};

/// Read the password from here instead of prompting (scripts, CI)
pub const ENV_PASSWORD: &str = "BANKDESK_PASSWORD";

pub trait Prompter {
    fn ask(&mut self, label: &str) -> io::Result<String>;
    /// Like `ask`, without echoing the input
    fn ask_password(&mut self, label: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal
pub struct Terminal;

impl Prompter for Terminal {
    fn ask(&mut self, label: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}: ", label)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_password(&mut self, label: &str) -> io::Result<String> {
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            return Ok(password);
        }
        rpassword::prompt_password(format!("{}: ", label))
    }
}
