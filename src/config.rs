use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use config::{Config, File};
use serde::Deserialize;

use crate::forwarder::ForwarderKind;

const DEFAULT_CONFIG_PATH: &str = "settings.yml";
const APP_PORT_ENV: &str = "APP_PORT";
const APP_FORWARDER_ENV: &str = "APP_FORWARDER";

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub forwarder: ForwarderKind,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub diag_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: 3000,
            forwarder: ForwarderKind::Template,
            cache_ttl: Duration::from_secs(3600),
            cache_max_capacity: 10_000,
            diag_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Deserialize)]
struct DefaultConfig {
    app_port: u16,
    forwarder: ForwarderKind,
    cache_ttl_s: u64,
    cache_max_capacity: u64,
    diag_interval_s: u64,
}

fn load_default_config() -> Result<DefaultConfig> {
    let defaults = Settings::default();

    let settings = Config::builder()
        .set_default("app_port", defaults.port)?
        .set_default("forwarder", defaults.forwarder.to_string())?
        .set_default("cache_ttl_s", defaults.cache_ttl.as_secs())?
        .set_default("cache_max_capacity", defaults.cache_max_capacity)?
        .set_default("diag_interval_s", defaults.diag_interval.as_secs())?
        .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
        .build()
        .map_err(|e| anyhow!("Failed to read config file: {e}"))?;

    settings
        .try_deserialize::<DefaultConfig>()
        .map_err(|e| anyhow!("Failed to deserialize config file: {e}"))
}

/// Try to parse env variable. If it's not set, return None. If it's invalid, treat it as an error.
fn try_from_env<T, F>(env_var: &str, f: F) -> Result<Option<T>>
where
    F: FnOnce(String) -> Result<T>,
{
    match std::env::var(env_var) {
        Ok(raw) => {
            let val = f(raw).map_err(|_| anyhow!("Failed to parse {}", env_var))?;
            Ok(Some(val))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(_) => bail!("Could not read {env_var} from env"),
    }
}

/// Load configuration from the config file, letting env override the port and forwarder.
pub fn load() -> Result<Settings> {
    let port_opt: Option<u16> = try_from_env(APP_PORT_ENV, |env_str| {
        env_str.parse::<u16>().map_err(|e| e.into())
    })?;

    let forwarder_opt: Option<ForwarderKind> = try_from_env(APP_FORWARDER_ENV, |env_str| {
        env_str.parse::<ForwarderKind>().map_err(|e| e.into())
    })?;

    let config = load_default_config()?;

    let port = match port_opt {
        Some(val) => val,
        None => {
            tracing::warn!("{APP_PORT_ENV} is not set, using value from {DEFAULT_CONFIG_PATH}");
            config.app_port
        }
    };

    let forwarder = match forwarder_opt {
        Some(val) => val,
        None => {
            tracing::warn!("{APP_FORWARDER_ENV} is not set, using value from {DEFAULT_CONFIG_PATH}");
            config.forwarder
        }
    };

    if config.diag_interval_s == 0 {
        bail!("diag_interval_s must be positive");
    }

    Ok(Settings {
        port,
        forwarder,
        cache_ttl: Duration::from_secs(config.cache_ttl_s),
        cache_max_capacity: config.cache_max_capacity,
        diag_interval: Duration::from_secs(config.diag_interval_s),
    })
}
