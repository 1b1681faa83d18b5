use actix_multipart::Multipart;
use actix_web::{HttpRequest, ResponseError, error::JsonPayloadError, web};
use futures_util::StreamExt;
use log::{error, warn};
use url::Url;

use crate::error::{Error, Result};

pub const IMAGE_FIELD: &str = "image";
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";
pub const NO_IMAGE_MESSAGE: &str = "No image file provided";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process QR code";

/// Accepts anything with a scheme the `url` crate can parse. The raw string,
/// not the normalised one, is what gets encoded.
pub fn validate_url(raw: &str) -> Result<()> {
    match Url::parse(raw) {
        Ok(_) => Ok(()),
        Err(err) => {
            warn!("[Validate URL] Rejected {raw:?} with err: {err}");
            Err(Error::validation(INVALID_URL_MESSAGE))
        }
    }
}

/// Keeps body errors on the `{ message }` contract instead of actix's plain text.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("[Json] Rejected request body with err: {err}");
    Error::validation(format!("Invalid request body: {err}")).into()
}

/// Runs CPU-bound QR work on the blocking pool.
pub async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await.map_err(|err| {
        error!("[Blocking] QR task did not complete: {err}");
        Error::internal(PROCESSING_FAILED_MESSAGE)
    })?
}

pub fn log_failure(tag: &str, err: &Error) {
    if err.status_code().is_server_error() {
        error!("{tag} Failed with {}: {err}", err.code());
    } else {
        warn!("{tag} Rejected with {}: {err}", err.code());
    }
}

/// Reads the first `image` field of a multipart upload into memory.
pub async fn read_image_field(mut payload: Multipart, limit: usize) -> Result<Vec<u8>> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|err| {
            warn!("[Multipart] Couldn't read field with err: {err}");
            Error::validation(NO_IMAGE_MESSAGE)
        })?;

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|err| Error::validation(format!("Couldn't read upload: {err}")))?;
            if bytes.len() + chunk.len() > limit {
                return Err(Error::validation(format!(
                    "Image exceeds the upload limit of {limit} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(Error::validation(NO_IMAGE_MESSAGE));
        }
        return Ok(bytes);
    }

    Err(Error::validation(NO_IMAGE_MESSAGE))
}
