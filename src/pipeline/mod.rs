//! Request-translation and response-validation pipeline.
//!
//! # Data Flow
//! ```text
//! incoming request URL (+ decoded xslFile)
//!     → query.rs (strip xslFile, keep the rest verbatim)
//!     → upstream.rs (one GET to the backend)
//!     → validator.rs (Unreachable | NonOk | InvalidXml | Ok)
//!         Ok      → stylesheet.rs (resolve name under root)
//!                 → transformer.rs (apply XSLT, serialize)
//!                 → 200 + transformed body
//!         NonOk   → backend status + body, byte for byte
//!         failure → envelope.rs (OAI-PMH error document + status)
//! ```
//!
//! # Design Decisions
//! - `Pipeline` is built once from startup config and shared read-only
//! - Every failure short-circuits; nothing partial is ever returned
//! - Only transform-engine and envelope-writer failures escape as `Err(PipelineFault)`

pub mod envelope;
pub mod query;
pub mod stylesheet;
pub mod transformer;
pub mod upstream;
pub mod validator;

use axum::body::Bytes;
use axum::http::StatusCode;
use thiserror::Error;

use crate::config::AdapterConfig;
use crate::observability::logging;
use envelope::{EnvelopeError, FailureKind};
use stylesheet::TransformSelector;
use transformer::TransformError;
use upstream::{UpstreamClient, UpstreamError};
use validator::ValidationOutcome;

/// Response produced by one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Failures with no place in the OAI error taxonomy.
#[derive(Debug, Error)]
pub enum PipelineFault {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Stateless adapter service.
#[derive(Debug, Clone)]
pub struct Pipeline {
    upstream: UpstreamClient,
    selector: TransformSelector,
}

impl Pipeline {
    pub fn new(config: &AdapterConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: UpstreamClient::new(&config.upstream)?,
            selector: TransformSelector::new(&config.stylesheets),
        })
    }

    /// Run the pipeline for one request.
    ///
    /// `request_url` is the URL as the client sent it; `xsl_file` is the
    /// decoded `xslFile` parameter, if any.
    pub async fn run(
        &self,
        request_url: &str,
        xsl_file: Option<&str>,
    ) -> Result<PipelineResponse, PipelineFault> {
        logging::pipeline_started(request_url);

        let base_url = query::base_url(request_url);
        let upstream_query = query::upstream_query(request_url);
        let upstream_url = self.upstream.url_for(upstream_query.as_deref());

        logging::sending_upstream(&upstream_url);
        let result = self.upstream.fetch(upstream_url).await;
        if let Err(e) = &result {
            tracing::debug!(error = %e, "Upstream request failed");
        }

        match validator::classify(result) {
            ValidationOutcome::Unreachable => envelope_response(FailureKind::Unreachable, base_url),
            ValidationOutcome::InvalidXml => envelope_response(FailureKind::InvalidXml, base_url),
            ValidationOutcome::NonOk { status, body } => {
                logging::forwarded_non_200(status, &body);
                match StatusCode::from_u16(status) {
                    Ok(status) => Ok(PipelineResponse { status, body }),
                    Err(_) => envelope_response(FailureKind::Internal, base_url),
                }
            }
            ValidationOutcome::Ok {
                document,
                embedded_error,
            } => {
                logging::received_valid_200(embedded_error.as_ref());

                let selection = match self.selector.resolve(xsl_file) {
                    Ok(selection) => selection,
                    Err(e) => {
                        let kind = FailureKind::StylesheetNotFound {
                            name: e.name().to_string(),
                        };
                        return envelope_response(kind, base_url);
                    }
                };

                let transformed = transformer::apply_blocking(selection, document).await?;
                Ok(PipelineResponse {
                    status: StatusCode::OK,
                    body: Bytes::from(transformed),
                })
            }
        }
    }
}

fn envelope_response(kind: FailureKind, base_url: &str) -> Result<PipelineResponse, PipelineFault> {
    let (status, xml) = envelope::build(&kind, base_url)?;
    logging::error_envelope(status, kind.log_intro(), &xml);
    Ok(PipelineResponse {
        status,
        body: Bytes::from(xml),
    })
}
