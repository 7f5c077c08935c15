//! Device command handler.

use tabled::Tabled;

use hartkey_core::{Coordinator, Device, Snapshot};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Last event")]
    last_event: String,
}

fn row(d: &Device, snapshot: &Snapshot, color: bool) -> DeviceRow {
    let last_event = snapshot.latest_event(&d.id).map_or_else(
        || "-".into(),
        |e| match e.raised_at {
            Some(at) => format!("{} ({})", e.event_type.label(), at.format("%Y-%m-%d %H:%M")),
            None => e.event_type.label().to_owned(),
        },
    );
    DeviceRow {
        id: d.id.clone(),
        name: d.display_name.clone(),
        dtype: d.model_name().into(),
        open: output::actionable_mark(d.is_actionable(), color),
        firmware: d.firmware_version.clone().unwrap_or_else(|| "-".into()),
        last_event,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = super::fetch_snapshot(coordinator).await?;
    let devices: Vec<Device> = snapshot
        .devices
        .iter()
        .filter(|d| !args.actionable || d.is_actionable())
        .cloned()
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &devices,
        |d| row(d, &snapshot, color),
        |d| d.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
