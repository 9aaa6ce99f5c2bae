//! OAI-PMH XSLT adapter library.
//!
//! Forwards a harvester's OAI-PMH request to a DSpace backend, validates
//! the XML it returns and rewrites it with a selectable XSLT stylesheet.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;

pub use config::schema::AdapterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, PipelineResponse};
