use std::path::PathBuf;

use anyhow::{Context, bail};

use warbler_api::ApiConfig;

/// Server settings, read from `WARBLER_*` variables and `DATABASE_URL`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub api: ApiConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; unset keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "warbler.db".into());
        let database_path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(&database_url)
            .into();

        let host = lookup("WARBLER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("WARBLER_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("WARBLER_PORT is not a port number: {raw:?}"))?,
            None => 5000,
        };

        let defaults = ApiConfig::default();
        let api = ApiConfig {
            csrf_enabled: flag(&lookup, "WARBLER_CSRF_ENABLED", defaults.csrf_enabled)?,
            secure_cookies: flag(&lookup, "WARBLER_SECURE_COOKIES", defaults.secure_cookies)?,
            session_minutes: match lookup("WARBLER_SESSION_MINUTES") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("WARBLER_SESSION_MINUTES is not a number: {raw:?}"))?,
                None => defaults.session_minutes,
            },
        };

        if api.session_minutes <= 0 {
            bail!("WARBLER_SESSION_MINUTES must be positive");
        }

        let static_dir = lookup("WARBLER_STATIC_DIR")
            .unwrap_or_else(|| "static".into())
            .into();

        Ok(Self {
            database_path,
            host,
            port,
            static_dir,
            api,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{key} must be true or false, got {raw:?}"),
    }
}
