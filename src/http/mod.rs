//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → oai_request_handler (rebuild request URL, read xslFile)
//!     → pipeline (rewrite → upstream → validate → transform | envelope)
//!     → text/xml response to the harvester
//! ```

pub mod server;

pub use server::{AppState, HttpServer, OAI_REQUEST_PATH};
