//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router exposing `GET /oai/request`
//! - Wire up middleware (request ID, tracing)
//! - Rebuild the client-visible request URL and hand it to the pipeline
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Instrument;

use crate::config::AdapterConfig;
use crate::pipeline::query::XSL_FILE_PARAM;
use crate::pipeline::upstream::UpstreamError;
use crate::pipeline::Pipeline;

/// Route served by the adapter.
pub const OAI_REQUEST_PATH: &str = "/oai/request";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

/// HTTP server for the adapter.
pub struct HttpServer {
    router: Router,
    config: AdapterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AdapterConfig) -> Result<Self, UpstreamError> {
        let state = AppState {
            pipeline: Arc::new(Pipeline::new(&config)?),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(OAI_REQUEST_PATH, get(oai_request_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_host = %self.config.upstream.host,
            upstream_port = self.config.upstream.port,
            stylesheet_root = %self.config.stylesheets.root_dir,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

/// `GET /oai/request`: run the pipeline and answer with `text/xml`.
async fn oai_request_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let request_url = request_url(&headers, &uri);
    let xsl_file = uri.query().and_then(xsl_file_param);

    let span = tracing::info_span!("oai_request", request_id = %request_id);
    let result = state
        .pipeline
        .run(&request_url, xsl_file.as_deref())
        .instrument(span)
        .await;

    match result {
        Ok(response) => (
            response.status,
            [(header::CONTENT_TYPE, "text/xml")],
            Body::from(response.body),
        )
            .into_response(),
        Err(fault) => {
            tracing::error!(request_id = %request_id, error = %fault, "Unhandled pipeline fault");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// The URL as the client addressed it: scheme, host, path and raw query.
fn request_url(headers: &HeaderMap, uri: &axum::http::Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(OAI_REQUEST_PATH);

    format!("{scheme}://{host}{path_and_query}")
}

/// Decoded value of the last `xslFile` parameter.
fn xsl_file_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == XSL_FILE_PARAM)
        .map(|(_, value)| value.into_owned())
        .last()
}
