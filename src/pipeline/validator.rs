//! Classification of the upstream result.
//!
//! Evaluated in order, exactly one outcome per request:
//! 1. no response at all → `Unreachable`
//! 2. status ≠ 200 → `NonOk` (body kept verbatim, never parsed)
//! 3. 200 with a body that is not well-formed XML → `InvalidXml`
//! 4. 200 with well-formed XML → `Ok`
//!
//! Well-formedness is decided by libxml in strict mode on the raw bytes, so
//! the encoding declared in the XML prolog is honored. The transformer
//! parses the same bytes with the same options.
//!
//! For `Ok` the body is also scanned for an OAI `<error code="...">`
//! element, with or without a namespace prefix. That is advisory only; the
//! document handed to the transformer is the untouched body.

use std::fmt;
use std::sync::LazyLock;

use axum::body::Bytes;
use libxml::parser::{Parser, ParserOptions};
use regex::Regex;

use crate::pipeline::upstream::{UpstreamError, UpstreamResponse};

// `<error>` or `<prefix:error>`, `code` anywhere among its attributes.
static ERROR_WITH_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<(?:[\w.-]+:)?error(?:\s+[\w:.-]+\s*=\s*"[^"]*")*?\s+code\s*=\s*"([^"]*)"(?:\s+[\w:.-]+\s*=\s*"[^"]*")*\s*>(.*?)</(?:[\w.-]+:)?error\s*>"#,
    )
    .expect("static regex")
});

static ERROR_SELF_CLOSING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(?:[\w.-]+:)?error(?:\s+[\w:.-]+\s*=\s*"[^"]*")*?\s+code\s*=\s*"([^"]*)"(?:\s+[\w:.-]+\s*=\s*"[^"]*")*\s*/>"#,
    )
    .expect("static regex")
});

/// Result of validating the upstream response.
#[derive(Debug)]
pub enum ValidationOutcome {
    Unreachable,
    NonOk { status: u16, body: Bytes },
    Ok {
        document: ValidatedXml,
        embedded_error: Option<EmbeddedError>,
    },
    InvalidXml,
}

/// An upstream body that has passed the well-formedness check.
///
/// Only [`classify`] constructs it. Holds the body byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedXml(Bytes);

impl ValidatedXml {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Error reported by the backend inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedError {
    pub code: String,
    pub text: Option<String>,
}

impl fmt::Display for EmbeddedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.text.as_deref().unwrap_or("-"))
    }
}

/// Classify the result of the upstream call.
pub fn classify(result: Result<UpstreamResponse, UpstreamError>) -> ValidationOutcome {
    let response = match result {
        Ok(response) => response,
        Err(_) => return ValidationOutcome::Unreachable,
    };

    if response.status != 200 {
        return ValidationOutcome::NonOk {
            status: response.status,
            body: response.body,
        };
    }

    if !is_well_formed(&response.body) {
        return ValidationOutcome::InvalidXml;
    }

    let embedded_error = extract_embedded_error(&String::from_utf8_lossy(&response.body));
    ValidationOutcome::Ok {
        document: ValidatedXml(response.body),
        embedded_error,
    }
}

/// libxml options shared by validation and transformation: no recovery,
/// no network access.
pub(crate) fn strict_options() -> ParserOptions<'static> {
    ParserOptions {
        recover: false,
        no_net: true,
        ..ParserOptions::default()
    }
}

/// Strict XML well-formedness check.
pub fn is_well_formed(body: &[u8]) -> bool {
    Parser::default()
        .parse_string_with_options(body, strict_options())
        .is_ok()
}

/// Find the first OAI error element in a raw response body.
///
/// An element with content wins over a self-closing one.
pub fn extract_embedded_error(body: &str) -> Option<EmbeddedError> {
    if let Some(caps) = ERROR_WITH_TEXT.captures(body) {
        return Some(EmbeddedError {
            code: caps[1].to_string(),
            text: Some(caps[2].to_string()),
        });
    }

    ERROR_SELF_CLOSING.captures(body).map(|caps| EmbeddedError {
        code: caps[1].to_string(),
        text: None,
    })
}
