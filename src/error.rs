//! Error types for placemark operations.

use thiserror::Error;

/// Errors that abort a load.
///
/// Degraded fields (a missing style, empty coordinates, an unknown template
/// token) never surface here; they fall back to absent values instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid KML: {0}")]
    InvalidKml(String),

    #[error("KMZ archive contains no KML entry")]
    MissingKmlEntry,

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl Error {
    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
