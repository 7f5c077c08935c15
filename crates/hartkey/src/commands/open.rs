//! Open command handler.

use hartkey_core::Coordinator;

use crate::cli::{GlobalOpts, OpenArgs};
use crate::error::CliError;

pub async fn handle(
    coordinator: &Coordinator,
    args: &OpenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(coordinator).await?;
    let name = snapshot
        .device(&args.device_id)
        .map(|d| d.display_name.clone())
        .ok_or_else(|| CliError::NotFound {
            identifier: args.device_id.clone(),
        })?;

    coordinator.issue_open_command(&args.device_id).await?;

    if !global.quiet {
        eprintln!("✓ Open command sent to {name}");
    }
    Ok(())
}
