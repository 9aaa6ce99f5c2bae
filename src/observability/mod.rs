//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline stages
//!     → logging.rs (structured events: start, upstream call, outcome, envelope)
//!     → tracing-subscriber fmt layer (stdout)
//!
//! http layer
//!     → tower-http TraceLayer (access spans)
//!     → x-request-id recorded on the pipeline span
//! ```

pub mod logging;
