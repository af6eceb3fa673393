//! Map parsed command-line arguments to the action the binary runs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::ARG_AUTH_SECRET;
use anyhow::{anyhow, Result};
use secrecy::SecretString;

/// Build the server action from validated CLI matches.
///
/// # Errors
/// Returns an error if the token secret is missing or blank.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let auth_secret = matches
        .get_one::<String>(ARG_AUTH_SECRET)
        .filter(|secret| !secret.trim().is_empty())
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --auth-secret (AUTH_SECRET)"))?;

    Ok(Action::Server(Args {
        auth_secret: SecretString::from(auth_secret),
    }))
}
