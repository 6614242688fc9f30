mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, io::ErrorKind};
use tracing::debug;

/// Environment variable holding the inference service credential.
pub const API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    load_from(env::var("CONFIG_PATH").ok(), env::var(API_KEY_ENV).ok()).await
}

/// Loads the YAML file at `explicit_path` (or the optional default file) and
/// merges in the credential.
pub async fn load_from(explicit_path: Option<String>, api_key: Option<String>) -> Result<Config> {
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    debug!("Loading configuration from: {}", config_path);

    let contents = match tokio::fs::read_to_string(&config_path).await {
        Ok(contents) => Some(contents),
        // The default file is optional, an explicitly requested one is not
        Err(e) if e.kind() == ErrorKind::NotFound && explicit_path.is_none() => None,
        Err(e) => {
            return Err(Error::config(format!(
                "Failed to read configuration file '{}': {}",
                config_path, e
            )));
        }
    };

    resolve(contents.as_deref(), api_key)
}

/// Builds the process configuration from optional YAML contents and the
/// credential looked up in the environment.
pub fn resolve(contents: Option<&str>, api_key: Option<String>) -> Result<Config> {
    let mut config: Config = match contents {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => Config::default(),
    };

    let api_key = api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            Error::config(format!(
                "{} is not set in the environment variables",
                API_KEY_ENV
            ))
        })?;

    if !config.server.path.starts_with('/') {
        return Err(Error::config(format!(
            "server.path must start with '/': {}",
            config.server.path
        )));
    }

    config.inference.api_key = api_key;
    Ok(config)
}
