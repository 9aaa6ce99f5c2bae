//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Provide the pipeline's event sink
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level
//! - Sink functions never fail and never influence the pipeline result

use axum::http::StatusCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use crate::config::ObservabilityConfig;
use crate::pipeline::validator::EmbeddedError;

/// Install the global subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    let level = &config.log_level;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("oai_xslt_adapter={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn pipeline_started(request_url: &str) {
    tracing::info!(request_url = %request_url, "Running OAI request pipeline");
}

pub fn sending_upstream(url: &Url) {
    tracing::info!(upstream_url = %url, "Sending request to DSpace");
}

pub fn received_valid_200(embedded_error: Option<&EmbeddedError>) {
    match embedded_error {
        Some(error) => tracing::info!(
            status = 200,
            embedded_error = %error,
            "Status 200 response with valid XML received from DSpace"
        ),
        None => tracing::info!(
            status = 200,
            "Status 200 response with valid XML received from DSpace, no errors"
        ),
    }
}

pub fn forwarded_non_200(status: u16, body: &[u8]) {
    tracing::warn!(
        status,
        body = %String::from_utf8_lossy(body),
        "Non 200 response received from DSpace, forwarding"
    );
}

pub fn error_envelope(status: StatusCode, intro: &str, xml: &str) {
    tracing::error!(status = status.as_u16(), error_xml = %xml, "{intro}");
}
