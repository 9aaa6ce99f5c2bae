//! XSLT application.
//!
//! libxml/libxslt documents are not `Send`, so the whole compile → parse →
//! apply → serialize sequence runs on one blocking thread and only owned
//! strings cross back to the async side. The compiled stylesheet is not
//! cached; it is loaded from disk for every request.
//!
//! Failures here have no OAI error code. They surface as [`TransformError`]
//! and the HTTP layer treats them as an unhandled fault.

use std::path::PathBuf;

use libxml::parser::Parser;
use thiserror::Error;

use crate::pipeline::stylesheet::StylesheetSelection;
use crate::pipeline::validator::{strict_options, ValidatedXml};

/// Errors raised by the transform engine.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("stylesheet path {0:?} is not valid UTF-8")]
    PathEncoding(PathBuf),

    #[error("failed to compile stylesheet {path:?}: {reason}")]
    Compile { path: PathBuf, reason: String },

    #[error("failed to load document for transformation: {0}")]
    Document(String),

    #[error("failed to apply stylesheet {path:?}: {reason}")]
    Apply { path: PathBuf, reason: String },

    #[error("transform task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Apply the selected stylesheet to a validated document and serialize the
/// result. Blocking.
pub fn apply(selection: &StylesheetSelection, document: &ValidatedXml) -> Result<String, TransformError> {
    let path = &selection.path;
    let path_str = path
        .to_str()
        .ok_or_else(|| TransformError::PathEncoding(path.clone()))?;

    let mut stylesheet = libxslt::parser::parse_file(path_str).map_err(|e| TransformError::Compile {
        path: path.clone(),
        reason: format!("{e:?}"),
    })?;

    let source = Parser::default()
        .parse_string_with_options(document.as_bytes(), strict_options())
        .map_err(|e| TransformError::Document(format!("{e:?}")))?;

    let result = stylesheet
        .transform(source, Vec::new())
        .map_err(|e| TransformError::Apply {
            path: path.clone(),
            reason: format!("{e:?}"),
        })?;

    Ok(result.to_string())
}

/// Run [`apply`] on the blocking thread pool.
pub async fn apply_blocking(
    selection: StylesheetSelection,
    document: ValidatedXml,
) -> Result<String, TransformError> {
    tokio::task::spawn_blocking(move || apply(&selection, &document)).await?
}
