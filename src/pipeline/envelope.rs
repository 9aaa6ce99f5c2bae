//! OAI-PMH error envelopes.
//!
//! Every failure branch except a forwarded non-200 response replaces the
//! response with an envelope of this shape:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <OAI-PMH xmlns=... xmlns:xsi=... xsi:schemaLocation=...>
//!   <responseDate>2024-05-02T10:00:00Z</responseDate>
//!   <request>{base request URL}</request>
//!   <error code="{code}">{text}</error>
//! </OAI-PMH>
//! ```
//!
//! The status code depends only on the failure kind. A missing stylesheet
//! is answered with 200 while the backend failures use 500.

use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";
const ROOT_ELEMENT: &str = "OAI-PMH";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("failed to write error envelope: {0}")]
    Write(String),
}

/// Failure kinds that produce an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// No response from the backend.
    Unreachable,
    /// Backend answered 200 with a body that is not well-formed XML.
    InvalidXml,
    /// The selected stylesheet does not exist under the root directory.
    StylesheetNotFound { name: String },
    /// Anything the adapter itself could not classify.
    Internal,
}

impl FailureKind {
    pub fn status(&self) -> StatusCode {
        match self {
            FailureKind::StylesheetNotFound { .. } => StatusCode::OK,
            FailureKind::Unreachable | FailureKind::InvalidXml | FailureKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The single entry reported for this kind.
    pub fn entry(&self) -> ErrorEntry {
        match self {
            FailureKind::Unreachable => ErrorEntry::new("dSpaceUnreachable", "Couldn't reach DSpace"),
            FailureKind::InvalidXml => {
                ErrorEntry::new("dSpaceXmlGenerationError", "Server generated non-valid XML")
            }
            FailureKind::StylesheetNotFound { name } => {
                ErrorEntry::new("badArgument", format!("XSLT file {name} not found"))
            }
            FailureKind::Internal => ErrorEntry::new("generic", "Invalid error type used"),
        }
    }

    /// Short description used when the envelope is logged.
    pub fn log_intro(&self) -> &'static str {
        match self {
            FailureKind::Unreachable => "DSpace unreachable error",
            FailureKind::InvalidXml => "XML from DSpace not valid",
            FailureKind::StylesheetNotFound { .. } => "xslFile parameter not valid",
            FailureKind::Internal => "Invalid error type used",
        }
    }
}

/// One `<error>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub code: String,
    pub text: String,
}

impl ErrorEntry {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

/// A complete error document. Always holds at least one entry.
#[derive(Debug, Clone)]
pub struct OaiErrorEnvelope {
    response_date: DateTime<Utc>,
    request_url: String,
    entries: Vec<ErrorEntry>,
}

impl OaiErrorEnvelope {
    /// Envelope stamped with the current time.
    pub fn new(request_url: impl Into<String>, first: ErrorEntry) -> Self {
        Self::at(Utc::now(), request_url, first)
    }

    pub fn at(response_date: DateTime<Utc>, request_url: impl Into<String>, first: ErrorEntry) -> Self {
        Self {
            response_date,
            request_url: request_url.into(),
            entries: vec![first],
        }
    }

    pub fn with_entry(mut self, entry: ErrorEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Serialize to the OAI-PMH XML text.
    pub fn to_xml(&self) -> Result<String, EnvelopeError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new(ROOT_ELEMENT);
        root.push_attribute(("xmlns", OAI_NAMESPACE));
        root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        root.push_attribute(("xsi:schemaLocation", OAI_SCHEMA_LOCATION));
        write(&mut writer, Event::Start(root))?;

        let date = self.response_date.to_rfc3339_opts(SecondsFormat::Secs, true);
        write_text_element(&mut writer, "responseDate", &[], &date)?;
        write_text_element(&mut writer, "request", &[], &self.request_url)?;
        for entry in &self.entries {
            write_text_element(&mut writer, "error", &[("code", entry.code.as_str())], &entry.text)?;
        }

        write(&mut writer, Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

        String::from_utf8(writer.into_inner()).map_err(|e| EnvelopeError::Write(e.to_string()))
    }
}

/// Build the envelope for `kind` and pick its status code.
pub fn build(kind: &FailureKind, base_url: &str) -> Result<(StatusCode, String), EnvelopeError> {
    let envelope = OaiErrorEnvelope::new(base_url, kind.entry());
    Ok((kind.status(), envelope.to_xml()?))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), EnvelopeError> {
    writer
        .write_event(event)
        .map_err(|e| EnvelopeError::Write(e.to_string()))
}

/// `<name>text</name>` on one line. Only `&`, `<` and `>` are escaped in text.
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<(), EnvelopeError> {
    let mut start = BytesStart::new(name);
    for &attribute in attributes {
        start.push_attribute(attribute);
    }
    write(writer, Event::Start(start))?;
    write(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    write(writer, Event::End(BytesEnd::new(name)))
}
