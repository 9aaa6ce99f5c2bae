//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports valid, paths well formed)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::{Component, Path};

use thiserror::Error;

use crate::config::schema::AdapterConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.host must not be empty")]
    EmptyHost,

    #[error("upstream.port must not be 0")]
    ZeroPort,

    #[error("upstream.path '{0}' must start with '/'")]
    RelativeUpstreamPath(String),

    #[error("stylesheets.default_file '{0}' must be a plain file name")]
    DefaultStylesheet(String),
}

/// Validate a configuration, collecting every problem.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if config.upstream.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if !config.upstream.path.starts_with('/') {
        errors.push(ValidationError::RelativeUpstreamPath(
            config.upstream.path.clone(),
        ));
    }

    if !is_plain_file_name(&config.stylesheets.default_file) {
        errors.push(ValidationError::DefaultStylesheet(
            config.stylesheets.default_file.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
