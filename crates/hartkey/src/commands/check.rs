//! Token check handler.

use hartkey_core::Coordinator;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// One devices call; distinguishes a rejected token from an unreachable API.
pub async fn handle(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    coordinator.fetcher().client().validate_token().await?;
    if !global.quiet {
        eprintln!("✓ Token accepted");
    }
    Ok(())
}
