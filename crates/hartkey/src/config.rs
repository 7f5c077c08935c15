//! CLI flag overrides on top of `hartkey-config`.
//!
//! Core never sees these -- it receives a pre-built `CoordinatorConfig`.

use secrecy::SecretString;

use hartkey_config::Config;
use hartkey_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use hartkey_config::{config_path, load_config, load_config_or_default, save_config};

/// Apply `--interval` / `--timeout` to a loaded config.
pub fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(minutes) = global.interval {
        cfg.update_interval = minutes;
    }
    if let Some(secs) = global.timeout {
        cfg.timeout = secs;
    }
}

/// Resolve the bearer token: `--token` / `HARTKEY_TOKEN` first, then the
/// config credential chain.
pub fn resolve_token(cfg: &Config, global: &GlobalOpts) -> Result<SecretString, CliError> {
    if let Some(ref token) = global.token {
        if !token.trim().is_empty() {
            return Ok(SecretString::from(token.clone()));
        }
    }
    Ok(hartkey_config::resolve_token(cfg)?)
}

/// Build a `CoordinatorConfig` from the config file, env and CLI overrides.
pub fn build_coordinator_config(global: &GlobalOpts) -> Result<CoordinatorConfig, CliError> {
    let mut cfg = load_config()?;
    apply_overrides(&mut cfg, global);
    let token = resolve_token(&cfg, global)?;
    Ok(hartkey_config::to_coordinator_config(&cfg, token)?)
}
