//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AdapterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {key}: {reason}")]
    Env { key: String, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AdapterConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AdapterConfig::default(),
    };

    let config = apply_env_overrides(config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the recognised environment variables on top of `config`.
///
/// Unknown keys are ignored so the whole process environment can be
/// passed in.
pub fn apply_env_overrides<I>(mut config: AdapterConfig, vars: I) -> Result<AdapterConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        match key.as_str() {
            "DSPACE_HOST" => config.upstream.host = value,
            "DSPACE_PORT" => {
                config.upstream.port = value.parse().map_err(|_| ConfigError::Env {
                    key: key.clone(),
                    reason: "expected a port number".into(),
                })?;
            }
            "XSL_ROOT_DIR" => config.stylesheets.root_dir = value,
            "DEFAULT_XSL_FILE" => config.stylesheets.default_file = value,
            "LOG_LEVEL" => config.observability.log_level = value,
            "PORT" => {
                let port: u16 = value.parse().map_err(|_| ConfigError::Env {
                    key: key.clone(),
                    reason: "expected a port number".into(),
                })?;
                let mut addr: SocketAddr =
                    config.listener.bind_address.parse().map_err(|_| ConfigError::Env {
                        key: key.clone(),
                        reason: format!(
                            "cannot apply to bind address '{}'",
                            config.listener.bind_address
                        ),
                    })?;
                addr.set_port(port);
                config.listener.bind_address = addr.to_string();
            }
            _ => {}
        }
    }

    Ok(config)
}
