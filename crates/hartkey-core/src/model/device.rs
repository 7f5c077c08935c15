// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Capability whose enabled state makes a device actionable.
pub const OPEN_DOOR_CAPABILITY: &str = "open_door";

/// Kinds of device the coordinator keeps. Anything else is dropped at
/// parse time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceType {
    Intercom,
    Gate,
}

impl DeviceType {
    /// Human-readable model name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Intercom => "Intercom",
            Self::Gate => "Gate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub enabled: bool,
}

/// One physical intercom or gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque id, stable across polls. Join key to events.
    pub id: String,
    pub device_type: DeviceType,
    /// description → user-set name → vendor name → `"<type> <id>"`.
    pub display_name: String,
    pub capabilities: Vec<Capability>,
    pub firmware_version: Option<String>,
    pub serial_number: Option<String>,
}

impl Device {
    /// `true` when the device reports an enabled `open_door` capability.
    pub fn is_actionable(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.name == OPEN_DOOR_CAPABILITY && c.enabled)
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c.name == name && c.enabled)
    }

    pub fn model_name(&self) -> &'static str {
        self.device_type.label()
    }

    /// First non-blank candidate wins; falls back to `"<type> <id>"`.
    pub fn derive_display_name(
        device_type: DeviceType,
        id: &str,
        candidates: &[Option<&str>],
    ) -> String {
        candidates
            .iter()
            .flatten()
            .copied()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map_or_else(|| format!("{} {id}", device_type.label()), str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn device(capabilities: Vec<Capability>) -> Device {
        Device {
            id: "7".into(),
            device_type: DeviceType::Intercom,
            display_name: "Lobby".into(),
            capabilities,
            firmware_version: None,
            serial_number: None,
        }
    }

    #[test]
    fn enabled_open_door_is_actionable() {
        let d = device(vec![Capability {
            name: "open_door".into(),
            enabled: true,
        }]);
        assert!(d.is_actionable());
    }

    #[test]
    fn disabled_open_door_is_not_actionable() {
        let d = device(vec![Capability {
            name: "open_door".into(),
            enabled: false,
        }]);
        assert!(!d.is_actionable());
    }

    #[test]
    fn missing_open_door_is_not_actionable() {
        let d = device(vec![Capability {
            name: "video".into(),
            enabled: true,
        }]);
        assert!(!d.is_actionable());
        assert!(d.has_capability("video"));
        assert!(!device(Vec::new()).is_actionable());
    }

    #[test]
    fn display_name_preference_chain() {
        let name = Device::derive_display_name(
            DeviceType::Gate,
            "9",
            &[None, Some("  "), Some("Yard gate"), Some("Vendor")],
        );
        assert_eq!(name, "Yard gate");

        let fallback = Device::derive_display_name(DeviceType::Gate, "9", &[None, None, None]);
        assert_eq!(fallback, "Gate 9");
    }

    #[test]
    fn device_type_wire_names() {
        assert_eq!(DeviceType::from_str("intercom").ok(), Some(DeviceType::Intercom));
        assert_eq!(DeviceType::from_str("gate").ok(), Some(DeviceType::Gate));
        assert!(DeviceType::from_str("camera").is_err());
        assert_eq!(DeviceType::Gate.to_string(), "gate");
    }
}
