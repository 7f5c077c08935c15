//! Command dispatch: bridges CLI args -> coordinator -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod devices;
pub mod events;
pub mod open;
pub mod watch;

use std::sync::Arc;

use hartkey_core::{Coordinator, Snapshot};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(coordinator, &args, global).await,
        Command::Events(args) => events::handle(coordinator, &args, global).await,
        Command::Open(args) => open::handle(coordinator, &args, global).await,
        Command::Watch => watch::handle(coordinator, global).await,
        Command::Check => check::handle(coordinator, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Run one refresh cycle and return the resulting snapshot.
pub(crate) async fn fetch_snapshot(coordinator: &Coordinator) -> Result<Arc<Snapshot>, CliError> {
    coordinator.request_refresh().await?;
    coordinator
        .current_snapshot()
        .ok_or_else(|| CliError::ApiError {
            message: "no data was published".into(),
        })
}
