//! Command handlers. Each takes the shared [`Context`] and one parsed
//! subcommand.

pub mod account;
pub mod admin;
pub mod banners;
pub mod dashboard;
pub mod polls;

use anyhow::{Context as _, Result, bail};
use votenow_client::VoteNowClient;

use crate::output::OutputManager;

pub struct Context {
    pub client: VoteNowClient,
    pub out: OutputManager,
}

impl Context {
    pub fn new(client: VoteNowClient, out: OutputManager) -> Self {
        Self { client, out }
    }

    /// Fail early with a readable hint when a command needs a session.
    pub fn require_login(&self) -> Result<()> {
        if !self.client.session().is_authenticated() {
            bail!("not logged in; run `votenow login` first");
        }
        Ok(())
    }
}

/// Use `given`, or ask for the password without echo.
fn password_or_prompt(given: Option<String>) -> Result<String> {
    match given {
        Some(password) => Ok(password),
        None => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()
            .context("failed to read password"),
    }
}

/// Ask before deleting; `--yes` skips the prompt.
fn confirm_delete(what: &str, count: usize, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    inquire::Confirm::new(&format!("Delete {count} {what}?"))
        .with_default(false)
        .prompt()
        .context("failed to read confirmation")
}
