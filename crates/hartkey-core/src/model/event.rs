// ── Event domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of access event.
///
/// The six known kinds are the ones the coordinator queries for.
/// Anything else the API sends passes through as [`EventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    ApiOpenRemote,
    FaceOpenRemote,
    PinCodeOpenRemote,
    CodeOpenLocal,
    RfidOpenLocal,
    DtmfOpenLocal,
    Other(String),
}

impl EventType {
    /// Kinds requested from the events endpoint, in query order.
    pub const QUERIED: [EventType; 6] = [
        Self::ApiOpenRemote,
        Self::FaceOpenRemote,
        Self::PinCodeOpenRemote,
        Self::CodeOpenLocal,
        Self::RfidOpenLocal,
        Self::DtmfOpenLocal,
    ];

    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "api_open_remote" => Self::ApiOpenRemote,
            "face_open_remote" => Self::FaceOpenRemote,
            "pin_code_open_remote" => Self::PinCodeOpenRemote,
            "code_open_local" => Self::CodeOpenLocal,
            "rfid_open_local" => Self::RfidOpenLocal,
            "dtmf_open_local" => Self::DtmfOpenLocal,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ApiOpenRemote => "api_open_remote",
            Self::FaceOpenRemote => "face_open_remote",
            Self::PinCodeOpenRemote => "pin_code_open_remote",
            Self::CodeOpenLocal => "code_open_local",
            Self::RfidOpenLocal => "rfid_open_local",
            Self::DtmfOpenLocal => "dtmf_open_local",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable description.
    pub fn label(&self) -> &str {
        match self {
            Self::ApiOpenRemote => "Opened via API",
            Self::FaceOpenRemote => "Opened by face recognition",
            Self::PinCodeOpenRemote => "Opened by PIN code",
            Self::CodeOpenLocal => "Opened by door code",
            Self::RfidOpenLocal => "Opened by RFID key",
            Self::DtmfOpenLocal => "Opened by DTMF",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

/// One historical open/access event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    /// May reference a device that is not in the current device list.
    pub device_id: String,
    pub event_type: EventType,
    pub raised_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub message: Option<String>,
    pub user_agent: Option<String>,
    pub rfid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::EventType;

    #[test]
    fn known_kinds_round_trip_through_wire_names() {
        for kind in EventType::QUERIED {
            assert_eq!(EventType::from_wire(kind.as_str()), kind);
            assert!(kind.is_known());
        }
    }

    #[test]
    fn unknown_kind_passes_through() {
        let kind = EventType::from_wire("call_missed");
        assert_eq!(kind, EventType::Other("call_missed".into()));
        assert_eq!(kind.as_str(), "call_missed");
        assert_eq!(kind.label(), "call_missed");
        assert!(!kind.is_known());
    }
}
