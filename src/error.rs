//! Error handling for the resident registry

use std::fmt;
use thiserror::Error;

use crate::validate::Violation;

/// Unified error type for the registry client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local mirror and export file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Remote table errors
    #[error("Database error: {0}")]
    Database(String),

    /// A record rejected by the central validation pass
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    /// Spreadsheet or PDF generation errors
    #[error("Export error: {0}")]
    Export(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new export error
    pub fn export<T: fmt::Display>(msg: T) -> Self {
        Error::Export(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The violations carried by a validation error, if any
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Error::Validation(v) => Some(v),
            _ => None,
        }
    }
}
