//! Error types for the QR endpoints.
//!
//! Client-caused failures map to `400`, store and runtime failures to `500`.
//! Every variant renders as a `{ "message": ... }` body whose text is shown
//! to the user as-is.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::types::Failure;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request: bad URL, missing or oversized file, bad JSON.
    #[error("{0}")]
    Validation(String),

    /// The encoder could not represent the payload.
    #[error("Failed to generate QR code: {0}")]
    EncodingFailed(String),

    /// The uploaded bytes are not a supported raster image.
    #[error("Unable to read image: {0}")]
    ImageDecodeFailed(#[source] image::ImageError),

    /// The image decoded but holds no readable QR symbol.
    #[error("Unable to decode QR code. Please try a different image.")]
    NoSymbolFound,

    #[error("activity store failed: {0}")]
    Store(#[from] anyhow::Error),

    /// Message is shown to the user; log the cause separately.
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Taxonomy tag used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EncodingFailed(_) => "ENCODING_FAILED",
            Self::ImageDecodeFailed(_) => "IMAGE_DECODE_FAILED",
            Self::NoSymbolFound => "NO_SYMBOL_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::EncodingFailed(_)
            | Self::ImageDecodeFailed(_)
            | Self::NoSymbolFound => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Failure {
            message: self.to_string(),
        })
    }
}
