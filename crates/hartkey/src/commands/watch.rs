//! Foreground polling loop.

use chrono::Local;

use hartkey_core::{Coordinator, PollState, Snapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn summary(snapshot: &Snapshot, state: &PollState, color: bool) -> String {
    let actionable = snapshot.actionable_devices().count();
    format!(
        "[{}] {} devices ({actionable} can open), {} events, data from {} -- {}",
        Local::now().format("%H:%M:%S"),
        snapshot.devices.len(),
        snapshot.event_count(),
        snapshot
            .fetched_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S"),
        output::paint_state(state, color),
    )
}

/// Start the coordinator and print a line on every publish until Ctrl-C.
pub async fn handle(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let mut snapshots = coordinator.subscribe();
    let states = coordinator.state();
    let color = output::should_color(&global.color);

    coordinator.start().await?;
    if !global.quiet {
        eprintln!(
            "Watching every {} min. Press Ctrl-C to stop.",
            coordinator.config().update_interval.minutes()
        );
    }

    loop {
        let latest = snapshots.borrow_and_update().clone();
        if let Some(snapshot) = latest {
            let state = states.borrow().clone();
            output::print_output(&summary(&snapshot, &state, color), global.quiet);
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    coordinator.shutdown().await;
    tracing::debug!("watch stopped");
    Ok(())
}
