use std::io;

use thiserror::Error;
use time::Date;
use uuid::Uuid;
use warp::reject;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx { source: sqlx::Error },

    /// Represents a reference to a submission that does not exist.
    #[error("no submission with ID {0}")]
    NonExistentId(i64),

    /// Represents a form token that is unknown or already used.
    #[error("invalid form token {token}")]
    InvalidToken { token: Uuid },

    /// Represents a required form field that was missing or blank.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// Represents a date field that could not be parsed as `YYYY-MM-DD`.
    #[error("malformed date: {value:?}")]
    MalformedDate {
        value: String,
        source: time::ParseError,
    },

    /// Represents a profile view past its validity window.
    #[error("credential for submission {id} expired on {expired_on}")]
    CredentialExpired { id: i64, expired_on: Date },

    /// Represents a failure to encode a locator as a scannable code.
    #[error("code generation error")]
    CodeGeneration { source: qrcode::types::QrError },

    /// Represents a failure to render a code image as PNG.
    #[error("image encoding error")]
    ImageEncoding { source: image::ImageError },

    /// Represents a failure to write a code image to the store.
    #[error("could not write image to {path}")]
    ImageWrite { path: String, source: io::Error },
}

impl reject::Reject for BackendError {}
