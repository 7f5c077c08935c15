// Wire shapes for the Hartkey API.
//
// Every field is optional and deserialized leniently: a field that is
// present but has the wrong JSON type reads as `None`. List fields are
// kept as raw `Value`s so the caller can drop malformed items one at a
// time instead of failing the whole response.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Timestamp format the events endpoint expects for its window bounds.
pub const RAISED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Deserialize `T` if the value has the right shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Opaque scalar as text: strings pass through, numbers and booleans are
/// rendered, anything else reads as `None`.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifier as the API sends it: sometimes a number, sometimes a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    /// Canonical string form. Empty strings count as no id.
    pub fn into_key(self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// `GET devices/intercom` body: `{ "data": { "devices": [...] } }`.
#[derive(Debug, Default, Deserialize)]
pub struct DevicesEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<DevicesData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DevicesData {
    #[serde(default, deserialize_with = "lenient")]
    pub devices: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDevice {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name_by_user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name_by_company: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub capabilities: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub firmware_version: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub serial_number: Option<String>,
}

/// One entry of a device's `capabilities` list.
///
/// The vendor reports the toggle as `setup`; `enabled` is accepted too.
#[derive(Debug, Default, Deserialize)]
pub struct RawCapability {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "setup", deserialize_with = "lenient")]
    pub enabled: Option<bool>,
}

// ── Events ───────────────────────────────────────────────────────────

/// `GET events/list` body: `{ "data": { "items": [...] } }`.
#[derive(Debug, Default, Deserialize)]
pub struct EventsEnvelope {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<EventsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsData {
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub device_id: Option<WireId>,
    #[serde(default, deserialize_with = "lenient")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub raised_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: Option<WireId>,
    #[serde(default, alias = "event_message", deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rfid: Option<String>,
}

// ── Queries ──────────────────────────────────────────────────────────

/// Query for `GET events/list`. Always sorted by `raised_at` descending.
#[derive(Debug, Clone)]
pub struct EventsQuery {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub device_ids: Vec<String>,
    pub event_types: Vec<String>,
    pub offset: u32,
    pub limit: u32,
}

impl EventsQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("begin_raised_at", self.begin.format(RAISED_AT_FORMAT).to_string()),
            ("end_raised_at", self.end.format(RAISED_AT_FORMAT).to_string()),
            ("device_ids", self.device_ids.join(",")),
            ("event_types", self.event_types.join(",")),
            ("sort_by", "raised_at".into()),
            ("sort_order", "desc".into()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn wrong_shaped_fields_read_as_absent() {
        let raw: RawDevice = serde_json::from_value(json!({
            "id": 17,
            "device_type": "intercom",
            "description": 42,
            "name_by_user": "Front door",
            "capabilities": "nope",
        }))
        .unwrap();

        assert_eq!(raw.id, Some(WireId::Int(17)));
        assert_eq!(raw.description, None);
        assert_eq!(raw.name_by_user.as_deref(), Some("Front door"));
        assert!(raw.capabilities.is_none());
    }

    #[test]
    fn opaque_metadata_keeps_numeric_values() {
        let raw: RawDevice = serde_json::from_value(json!({
            "id": 17,
            "firmware_version": 2.5,
            "serial_number": 12345,
        }))
        .unwrap();
        assert_eq!(raw.firmware_version.as_deref(), Some("2.5"));
        assert_eq!(raw.serial_number.as_deref(), Some("12345"));

        let raw: RawDevice =
            serde_json::from_value(json!({ "serial_number": ["x"], "firmware_version": null }))
                .unwrap();
        assert!(raw.serial_number.is_none());
        assert!(raw.firmware_version.is_none());
    }

    #[test]
    fn envelope_with_non_object_data_is_empty() {
        let env: DevicesEnvelope = serde_json::from_value(json!({ "data": [1, 2] })).unwrap();
        assert!(env.data.is_none());

        let env: EventsEnvelope =
            serde_json::from_value(json!({ "data": { "items": {} } })).unwrap();
        assert!(env.data.unwrap().items.is_none());
    }

    #[test]
    fn capability_accepts_setup_key() {
        let cap: RawCapability =
            serde_json::from_value(json!({ "name": "open_door", "setup": true })).unwrap();
        assert_eq!(cap.enabled, Some(true));
    }

    #[test]
    fn wire_id_key_rejects_blank() {
        assert_eq!(WireId::Text("  ".into()).into_key(), None);
        assert_eq!(WireId::Int(5).into_key().as_deref(), Some("5"));
    }

    #[test]
    fn events_query_params() {
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let query = EventsQuery {
            begin: end - chrono::Duration::days(7),
            end,
            device_ids: vec!["1".into(), "2".into()],
            event_types: vec!["api_open_remote".into(), "rfid_open_local".into()],
            offset: 0,
            limit: 100,
        };

        let params = query.to_params();
        assert_eq!(params[0], ("begin_raised_at", "2024-06-08T10:30:00Z".into()));
        assert_eq!(params[1], ("end_raised_at", "2024-06-15T10:30:00Z".into()));
        assert_eq!(params[2], ("device_ids", "1,2".into()));
        assert_eq!(
            params[3],
            ("event_types", "api_open_remote,rfid_open_local".into())
        );
        assert_eq!(params[7], ("limit", "100".into()));
    }
}
