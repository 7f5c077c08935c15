//! Shared configuration for Hartkey tools.
//!
//! TOML file + `HARTKEY_*` environment, bearer-token resolution
//! (env var → keyring → plaintext), and translation to
//! `hartkey_core::CoordinatorConfig`. The CLI layers its flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hartkey_api::Endpoints;
use hartkey_core::{CoordinatorConfig, UpdateInterval};

const KEYRING_SERVICE: &str = "hartkey";
const KEYRING_USER: &str = "bearer-token";

/// Upper bound for the per-request `timeout`, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Extra headroom the event call gets over `timeout`.
const EVENTS_TIMEOUT_HEADROOM: Duration = Duration::from_secs(5);

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bearer token configured")]
    NoCredentials,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Bearer token (plaintext: prefer keyring or env var).
    pub bearer_token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub bearer_token_env: Option<String>,

    /// Minutes between periodic refreshes (1–1440).
    #[serde(default = "default_update_interval")]
    pub update_interval: u32,

    /// Seconds allowed for the device and open calls.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Override for the household API base URL.
    pub household_url: Option<String>,

    /// Override for the events API base URL.
    pub events_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bearer_token: None,
            bearer_token_env: None,
            update_interval: default_update_interval(),
            timeout: default_timeout(),
            household_url: None,
            events_url: None,
        }
    }
}

fn default_update_interval() -> u32 {
    UpdateInterval::DEFAULT_MINUTES
}
fn default_timeout() -> u64 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hartkey", "hartkey").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hartkey");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HARTKEY_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token from the credential chain (no CLI flag step).
pub fn resolve_token(cfg: &Config) -> Result<SecretString, ConfigError> {
    // 1. Configured env var
    if let Some(ref env_name) = cfg.bearer_token_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.trim().is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = cfg.bearer_token {
        if !token.trim().is_empty() {
            return Ok(SecretString::from(token.clone()));
        }
    }

    Err(ConfigError::NoCredentials)
}

/// Store a bearer token in the system keyring.
pub fn store_token_in_keyring(token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    entry.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate the config and build a `CoordinatorConfig` around `token`.
pub fn to_coordinator_config(
    cfg: &Config,
    token: SecretString,
) -> Result<CoordinatorConfig, ConfigError> {
    let update_interval =
        UpdateInterval::from_minutes(cfg.update_interval).map_err(|_| ConfigError::Validation {
            field: "update_interval".into(),
            reason: format!(
                "expected {}–{} minutes, got {}",
                UpdateInterval::MIN_MINUTES,
                UpdateInterval::MAX_MINUTES,
                cfg.update_interval
            ),
        })?;

    if !(1..=MAX_TIMEOUT_SECS).contains(&cfg.timeout) {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: format!("expected 1–{MAX_TIMEOUT_SECS} seconds, got {}", cfg.timeout),
        });
    }

    let endpoints = resolve_endpoints(cfg)?;
    let timeout = Duration::from_secs(cfg.timeout);

    let mut config = CoordinatorConfig::new(token);
    config.endpoints = endpoints;
    config.update_interval = update_interval;
    config.devices_timeout = timeout;
    config.open_timeout = timeout;
    config.events_timeout = timeout + EVENTS_TIMEOUT_HEADROOM;
    Ok(config)
}

fn resolve_endpoints(cfg: &Config) -> Result<Endpoints, ConfigError> {
    let vendor = Endpoints::vendor();
    let household = cfg
        .household_url
        .clone()
        .unwrap_or_else(|| vendor.household.to_string());
    let events = cfg
        .events_url
        .clone()
        .unwrap_or_else(|| vendor.events.to_string());

    for (field, value) in [("household_url", &household), ("events_url", &events)] {
        let url: url::Url = value.parse().map_err(|_| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL: {value}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: format!("expected an http(s) URL, got {value}"),
            });
        }
    }

    Endpoints::new(&household, &events).map_err(|e| ConfigError::Validation {
        field: "endpoints".into(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.update_interval, 5);
        assert_eq!(cfg.timeout, 10);
        assert!(cfg.household_url.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "update_interval = 15\nbearer_token = \"abc\"\nevents_url = \"http://localhost:9000/api/v2\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.update_interval, 15);
        assert_eq!(cfg.bearer_token.as_deref(), Some("abc"));
        assert_eq!(cfg.timeout, 10);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            update_interval: 30,
            bearer_token_env: Some("MY_HARTKEY_TOKEN".into()),
            ..Config::default()
        };

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn falls_back_to_plaintext_token() {
        let cfg = Config {
            bearer_token_env: Some("HARTKEY_TEST_UNSET_TOKEN_VAR".into()),
            bearer_token: Some("plain".into()),
            ..Config::default()
        };
        // The keyring may or may not hold a token on the test host.
        let token = resolve_token(&cfg).unwrap();
        assert!(!token.expose_secret().is_empty());
    }

    #[test]
    fn interval_out_of_range_is_rejected() {
        for minutes in [0, 1441] {
            let cfg = Config {
                update_interval: minutes,
                ..Config::default()
            };
            let err = to_coordinator_config(&cfg, SecretString::from("t")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "update_interval"));
        }
    }

    #[test]
    fn coordinator_config_uses_overrides() {
        let cfg = Config {
            update_interval: 1,
            timeout: 4,
            household_url: Some("http://127.0.0.1:8080/api/v2/app".into()),
            ..Config::default()
        };
        let config = to_coordinator_config(&cfg, SecretString::from("t")).unwrap();

        assert_eq!(config.update_interval.minutes(), 1);
        assert_eq!(config.devices_timeout, Duration::from_secs(4));
        assert_eq!(config.events_timeout, Duration::from_secs(9));
        assert_eq!(
            config.endpoints.household.as_str(),
            "http://127.0.0.1:8080/api/v2/app/"
        );
        assert_eq!(config.endpoints.events, Endpoints::vendor().events);
    }

    #[test]
    fn timeout_out_of_range_is_rejected() {
        for secs in [0, MAX_TIMEOUT_SECS + 1, u64::MAX] {
            let cfg = Config {
                timeout: secs,
                ..Config::default()
            };
            let err = to_coordinator_config(&cfg, SecretString::from("t")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "timeout"));
        }

        let cfg = Config {
            timeout: MAX_TIMEOUT_SECS,
            ..Config::default()
        };
        let config = to_coordinator_config(&cfg, SecretString::from("t")).unwrap();
        assert_eq!(config.devices_timeout, Duration::from_secs(MAX_TIMEOUT_SECS));
    }

    #[test]
    fn bad_url_is_rejected() {
        let cfg = Config {
            events_url: Some("not a url".into()),
            ..Config::default()
        };
        let err = to_coordinator_config(&cfg, SecretString::from("t")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "events_url"));
    }
}
