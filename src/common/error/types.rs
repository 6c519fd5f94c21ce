//! Unified error types for deckgene.
//!
//! Every failure surfaced to a caller maps onto one [`ErrorKind`], so the
//! outer layers can report `{kind, message}` without inspecting variants.
use crate::style::Palette;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for deckgene operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid request: unknown preset, malformed breeding request, empty outline
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reference document unreadable or in an unsupported format
    ///
    /// `observed` holds the palette gathered before the failure, if any, so the
    /// caller can fall back to the nearest builtin preset.
    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        observed: Option<Box<Palette>>,
    },

    /// Content could not be laid out as requested
    #[error("Compilation error: {0}")]
    Compilation(String),

    /// Serialization of the package failed
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// An image asset could not be retrieved or decoded
    #[error("Image fetch error: {0}")]
    ImageFetch(String),

    /// The request was cancelled before the package was written
    #[error("Request cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),
}

impl Error {
    /// Shorthand for an extraction error without any salvaged palette.
    pub fn extraction(message: impl Into<String>) -> Self {
        Error::Extraction {
            message: message.into(),
            observed: None,
        }
    }

    /// The taxonomy entry this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Extraction { .. } => ErrorKind::Extraction,
            Error::Compilation(_) => ErrorKind::Compilation,
            Error::ImageFetch(_) => ErrorKind::ImageFetch,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Packaging(_) | Error::Io(_) | Error::XmlError(_) | Error::ZipError(_) => {
                ErrorKind::Packaging
            },
        }
    }

    /// Structured `{kind, message}` form for callers.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Error taxonomy shared by fatal errors and non-fatal warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Extraction,
    Compilation,
    Packaging,
    ImageFetch,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Extraction => "extraction",
            Self::Compilation => "compilation",
            Self::Packaging => "packaging",
            Self::ImageFetch => "image_fetch",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-facing error: a kind and a human-readable message, never a backtrace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        err.report()
    }
}

/// A recovered problem recorded in the deck metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: ErrorKind,
    /// Zero-based slide index the warning refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide: Option<usize>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            slide: None,
            message: message.into(),
        }
    }

    pub fn on_slide(kind: ErrorKind, slide: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            slide: Some(slide),
            message: message.into(),
        }
    }
}

impl From<Error> for Warning {
    fn from(err: Error) -> Self {
        Warning::new(err.kind(), err.to_string())
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slide {
            Some(slide) => write!(f, "[{}] slide {}: {}", self.kind, slide + 1, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Result type for deckgene operations.
pub type Result<T> = std::result::Result<T, Error>;
