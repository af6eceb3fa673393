use crate::{cli::globals::GlobalArgs, portico};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub auth_secret: SecretString,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    let globals = GlobalArgs::new(args.auth_secret);

    debug!("Global args: {:?}", globals);

    portico::new(portico::PORT, &globals).await
}
