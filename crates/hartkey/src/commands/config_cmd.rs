//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;

use hartkey_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn store_in_keyring(token: &str) -> Result<(), CliError> {
    hartkey_config::store_token_in_keyring(token).map_err(|e| CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store token in keyring: {e}"),
    })
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("expected a number, got '{value}'"),
    })
}

/// Config as shown by `config show`: the token itself is never printed.
#[derive(Serialize)]
struct ConfigView<'a> {
    path: String,
    update_interval: u32,
    timeout: u64,
    household_url: Option<&'a str>,
    events_url: Option<&'a str>,
    bearer_token_env: Option<&'a str>,
    plaintext_token: bool,
}

impl<'a> ConfigView<'a> {
    fn new(cfg: &'a Config) -> Self {
        Self {
            path: config::config_path().display().to_string(),
            update_interval: cfg.update_interval,
            timeout: cfg.timeout,
            household_url: cfg.household_url.as_deref(),
            events_url: cfg.events_url.as_deref(),
            bearer_token_env: cfg.bearer_token_env.as_deref(),
            plaintext_token: cfg.bearer_token.is_some(),
        }
    }
}

fn detail(v: &ConfigView<'_>) -> String {
    [
        format!("Path:             {}", v.path),
        format!("Update interval:  {} min", v.update_interval),
        format!("Timeout:          {}s", v.timeout),
        format!("Household URL:    {}", v.household_url.unwrap_or("(default)")),
        format!("Events URL:       {}", v.events_url.unwrap_or("(default)")),
        format!("Token env var:    {}", v.bearer_token_env.unwrap_or("-")),
        format!(
            "Plaintext token:  {}",
            if v.plaintext_token { "yes" } else { "no" }
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Hartkey -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let update_interval: u32 = Input::new()
                .with_prompt("Refresh interval in minutes (1-1440)")
                .default(hartkey_core::UpdateInterval::DEFAULT_MINUTES)
                .interact_text()
                .map_err(prompt_err)?;

            let store_choices = &[
                "Store in system keyring (recommended)",
                "Read from an environment variable",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where should the bearer token live?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut cfg = Config {
                update_interval,
                ..Config::default()
            };

            match store_selection {
                0 => {
                    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
                    require_token(&token)?;
                    store_in_keyring(token.trim())?;
                    eprintln!("   ✓ Token stored in system keyring");
                }
                1 => {
                    let var: String = Input::new()
                        .with_prompt("Environment variable name")
                        .default("HARTKEY_BEARER".into())
                        .interact_text()
                        .map_err(prompt_err)?;
                    cfg.bearer_token_env = Some(var);
                }
                _ => {
                    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
                    require_token(&token)?;
                    cfg.bearer_token = Some(token.trim().to_owned());
                }
            }

            // Validate before writing.
            hartkey_config::to_coordinator_config(&cfg, secrecy::SecretString::from("probe"))?;
            let written = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", written.display());
            eprintln!("\n  Test it: hartkey check");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let view = ConfigView::new(&cfg);
            let out = output::render_single(&global.output, &view, detail, |v| v.path.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;

            match key.as_str() {
                "update_interval" | "update-interval" | "interval" => {
                    cfg.update_interval = parse_number("update_interval", &value)?;
                }
                "timeout" => cfg.timeout = parse_number("timeout", &value)?,
                "bearer_token_env" | "bearer-token-env" => cfg.bearer_token_env = Some(value),
                "household_url" | "household-url" => cfg.household_url = Some(value),
                "events_url" | "events-url" => cfg.events_url = Some(value),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: update_interval, \
                             timeout, bearer_token_env, household_url, events_url"
                        ),
                    });
                }
            }

            hartkey_config::to_coordinator_config(&cfg, secrecy::SecretString::from("probe"))?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key}");
            }
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { token } => {
            let token = match token {
                Some(t) => t,
                None => rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?,
            };
            require_token(&token)?;
            store_in_keyring(token.trim())?;
            if !global.quiet {
                eprintln!("✓ Token stored in system keyring");
            }
            Ok(())
        }
    }
}

fn require_token(token: &str) -> Result<(), CliError> {
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "bearer_token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(())
}
