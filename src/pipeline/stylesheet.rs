//! Stylesheet selection.
//!
//! # Responsibilities
//! - Pick the client's `xslFile` value or the configured default
//! - Resolve it against the stylesheet root directory
//! - Reject names that do not resolve to a readable regular file
//!
//! # Design Decisions
//! - Names must be a single normal path component. Anything with a
//!   separator, `..`, or a root is refused before the filesystem is touched,
//!   so a request can never select a file outside the root directory.
//! - A refused name is reported exactly like a missing file

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::config::StylesheetConfig;

/// Reasons a requested stylesheet cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StylesheetError {
    #[error("XSLT file {name} not found")]
    NotFound { name: String },

    #[error("XSLT file {name} is not a plain file name")]
    OutsideRoot { name: String },
}

impl StylesheetError {
    /// The stylesheet name as the client sent it.
    pub fn name(&self) -> &str {
        match self {
            StylesheetError::NotFound { name } | StylesheetError::OutsideRoot { name } => name,
        }
    }
}

/// A stylesheet that exists under the root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetSelection {
    /// File name as requested (or the default).
    pub requested: String,
    /// Resolved path on disk.
    pub path: PathBuf,
}

/// Resolves stylesheet names against the configured root.
#[derive(Debug, Clone)]
pub struct TransformSelector {
    root: PathBuf,
    default_file: String,
}

impl TransformSelector {
    pub fn new(config: &StylesheetConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_dir),
            default_file: config.default_file.clone(),
        }
    }

    /// Resolve the requested name, falling back to the default.
    pub fn resolve(&self, requested: Option<&str>) -> Result<StylesheetSelection, StylesheetError> {
        let name = requested.unwrap_or(&self.default_file);

        if !is_single_component(name) {
            return Err(StylesheetError::OutsideRoot {
                name: name.to_string(),
            });
        }

        let path = self.root.join(name);
        if !is_readable_file(&path) {
            return Err(StylesheetError::NotFound {
                name: name.to_string(),
            });
        }

        Ok(StylesheetSelection {
            requested: name.to_string(),
            path,
        })
    }
}

fn is_single_component(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}
