// ── API-to-domain type conversions ──
//
// The single parse boundary between raw API JSON and the domain model.
// Shape problems are resolved here at the smallest granularity: a bad
// field reads as absent, a bad list item is dropped, a missing list is
// empty. The only structural failure is a device response whose top
// level is not a JSON object.

use std::str::FromStr;

use hartkey_api::types::{
    DevicesEnvelope, EventsEnvelope, RawCapability, RawDevice, RawEvent, WireId,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Capability, Device, DeviceType, Event, EventType};

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// Parse a `devices/intercom` payload into intercoms and gates, in API order.
pub fn parse_devices(body: Value) -> Result<Vec<Device>, CoreError> {
    if !body.is_object() {
        return Err(CoreError::MalformedResponse {
            message: format!("expected a JSON object for devices, got {}", json_kind(&body)),
        });
    }

    let envelope: DevicesEnvelope =
        serde_json::from_value(body).map_err(|e| CoreError::MalformedResponse {
            message: e.to_string(),
        })?;
    let items = envelope
        .data
        .and_then(|data| data.devices)
        .unwrap_or_default();

    let total = items.len();
    let devices: Vec<Device> = items.into_iter().filter_map(device_from_value).collect();

    if devices.len() < total {
        debug!(
            dropped = total - devices.len(),
            "skipped devices that are not intercoms or gates"
        );
    }
    info!(count = devices.len(), "found valid devices (intercom/gate)");
    Ok(devices)
}

fn device_from_value(item: Value) -> Option<Device> {
    if !item.is_object() {
        return None;
    }
    let raw: RawDevice = serde_json::from_value(item).ok()?;
    let device_type = DeviceType::from_str(raw.device_type.as_deref()?).ok()?;
    let Some(id) = raw.id.and_then(WireId::into_key) else {
        debug!(%device_type, "skipping device without an id");
        return None;
    };

    let display_name = Device::derive_display_name(
        device_type,
        &id,
        &[
            raw.description.as_deref(),
            raw.name_by_user.as_deref(),
            raw.name_by_company.as_deref(),
        ],
    );

    let capabilities = raw
        .capabilities
        .unwrap_or_default()
        .into_iter()
        .filter_map(capability_from_value)
        .collect();

    Some(Device {
        id,
        device_type,
        display_name,
        capabilities,
        firmware_version: raw.firmware_version,
        serial_number: raw.serial_number,
    })
}

fn capability_from_value(item: Value) -> Option<Capability> {
    let raw: RawCapability = serde_json::from_value(item).ok()?;
    Some(Capability {
        name: raw.name?,
        enabled: raw.enabled.unwrap_or(false),
    })
}

// ── Events ───────────────────────────────────────────────────────────

/// Group an `events/list` payload by device id.
///
/// Never fails. Groups appear in first-seen order and each group keeps
/// the order the API supplied (newest first for our queries).
pub fn parse_events(body: Value) -> IndexMap<String, Vec<Event>> {
    if !body.is_object() {
        warn!(kind = json_kind(&body), "expected a JSON object for events");
        return IndexMap::new();
    }

    let items = serde_json::from_value::<EventsEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.data)
        .and_then(|data| data.items)
        .unwrap_or_default();
    debug!(total = items.len(), "events found in response");

    let mut grouped: IndexMap<String, Vec<Event>> = IndexMap::new();
    let mut count = 0usize;
    for event in items.into_iter().filter_map(event_from_value) {
        grouped.entry(event.device_id.clone()).or_default().push(event);
        count += 1;
    }

    debug!(events = count, devices = grouped.len(), "parsed events");
    grouped
}

fn event_from_value(item: Value) -> Option<Event> {
    if !item.is_object() {
        return None;
    }
    let raw: RawEvent = serde_json::from_value(item).ok()?;
    let device_id = raw.device_id?.into_key()?;

    Some(Event {
        id: raw.id.and_then(WireId::into_key),
        device_id,
        event_type: raw
            .event_type
            .as_deref()
            .map_or_else(|| EventType::Other(String::new()), EventType::from_wire),
        raised_at: raw.raised_at,
        user_id: raw.user_id.and_then(WireId::into_key),
        message: raw.message,
        user_agent: raw.user_agent,
        rfid: raw.rfid,
    })
}
