//! Interactive confirmation and secret entry.

use std::io::{self, BufRead, Write};

/// Terminal interaction needed by the orchestrator.
///
/// Behind a trait so the restore and prune flows are testable without a tty.
pub trait Prompt {
    /// Asks a yes/no question; only an explicit yes answers `true`.
    fn confirm(&self, message: &str) -> io::Result<bool>;

    /// Reads a secret without echoing it back.
    fn secret(&self, message: &str) -> io::Result<String>;
}

/// [Prompt] on the controlling terminal.
#[derive(Debug, Default)]
pub struct Terminal;

impl Prompt for Terminal {
    fn confirm(&self, message: &str) -> io::Result<bool> {
        print!("{message} [y/n]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;

        let response = response.trim().to_lowercase();
        Ok(response == "y" || response == "yes")
    }

    fn secret(&self, message: &str) -> io::Result<String> {
        rpassword::prompt_password(format!("{message}: "))
    }
}
