//! Event command handler.

use std::cmp::Reverse;

use tabled::Tabled;

use hartkey_core::{Coordinator, Event, Snapshot};

use crate::cli::{EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Event")]
    kind: String,
    #[tabled(rename = "Details")]
    details: String,
}

fn row(e: &Event, snapshot: &Snapshot) -> EventRow {
    let device = snapshot
        .device(&e.device_id)
        .map_or_else(|| e.device_id.clone(), |d| d.display_name.clone());
    let details = [e.message.as_deref(), e.user_agent.as_deref(), e.rfid.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");
    EventRow {
        time: e.raised_at.map_or_else(
            || "-".into(),
            |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        device,
        kind: e.event_type.label().to_owned(),
        details,
    }
}

/// Newest first across all selected devices; undated events sort last.
fn select_events(snapshot: &Snapshot, device: Option<&str>, limit: usize) -> Vec<Event> {
    let mut events: Vec<Event> = match device {
        Some(id) => snapshot.events_for(id).to_vec(),
        None => snapshot.events.values().flatten().cloned().collect(),
    };
    events.sort_by_key(|e| Reverse(e.raised_at));
    events.truncate(limit);
    events
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: &EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(coordinator).await?;

    if let Some(ref id) = args.device {
        if snapshot.device(id).is_none() {
            return Err(CliError::NotFound {
                identifier: id.clone(),
            });
        }
    }

    let events = select_events(&snapshot, args.device.as_deref(), args.limit);
    let out = output::render_list(
        &global.output,
        &events,
        |e| row(e, &snapshot),
        |e| e.id.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
