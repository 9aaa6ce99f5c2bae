//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the adapter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the OAI-PMH adapter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdapterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend repository service the OAI-PMH requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Stylesheet lookup settings.
    pub stylesheets: StylesheetConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9292").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9292".to_string(),
        }
    }
}

/// Upstream (DSpace) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend host name or IP.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Fixed path of the backend OAI endpoint.
    pub path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            path: "/server/oai/request".to_string(),
        }
    }
}

/// Stylesheet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StylesheetConfig {
    /// Directory every stylesheet name is resolved against.
    pub root_dir: String,

    /// Stylesheet used when the client does not send `xslFile`.
    pub default_file: String,
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            root_dir: "xsl".to_string(),
            default_file: "uppsok-dspace2libris.xsl".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
