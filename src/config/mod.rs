//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides: DSPACE_HOST, DSPACE_PORT, XSL_ROOT_DIR,
//!       DEFAULT_XSL_FILE, PORT, LOG_LEVEL (loader.rs)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → shared via Arc with every pipeline invocation
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AdapterConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::StylesheetConfig;
pub use schema::UpstreamConfig;
