use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Responder, ResponseError, post, web};
use log::info;

use crate::{
    qr,
    types::{AppData, DecodedQr, GenerateQr, GeneratedQr},
    utils::{log_failure, read_image_field, run_blocking, validate_url},
};

#[post("/generate-qr")]
pub async fn generate_qr(body: web::Json<GenerateQr>, data: AppData) -> impl Responder {
    let url = body.into_inner().url;

    if let Err(err) = validate_url(&url) {
        log_failure("[Generate QR]", &err);
        return err.error_response();
    }

    info!("[Generate QR] Encoding {url}");
    let store = Arc::clone(&data.store);
    match run_blocking(move || qr::generate(store.as_ref(), &url)).await {
        Ok(qr_code_data_url) => {
            info!("[Generate QR] Generated QR code successfully");
            HttpResponse::Ok().json(GeneratedQr { qr_code_data_url })
        }
        Err(err) => {
            log_failure("[Generate QR]", &err);
            err.error_response()
        }
    }
}

#[post("/decode-qr")]
pub async fn decode_qr(payload: Multipart, data: AppData) -> impl Responder {
    let bytes = match read_image_field(payload, data.max_upload_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log_failure("[Decode QR]", &err);
            return err.error_response();
        }
    };

    info!("[Decode QR] Scanning {} byte upload", bytes.len());
    let store = Arc::clone(&data.store);
    match run_blocking(move || qr::decode(store.as_ref(), &bytes)).await {
        Ok(url) => {
            info!("[Decode QR] Decoded {url}");
            HttpResponse::Ok().json(DecodedQr { url })
        }
        Err(err) => {
            log_failure("[Decode QR]", &err);
            err.error_response()
        }
    }
}
