use actix_web::{HttpResponse, Responder, delete};
use log::{error, info};

use crate::types::{AppData, Failure, Success};

#[delete("/activities")]
pub async fn clear_activities(data: AppData) -> impl Responder {
    match data.store.clear() {
        Ok(()) => {
            info!("[Clear Activities] Cleared activities successfully");
            HttpResponse::Ok().json(Success {
                message: "Activities cleared".into(),
            })
        }
        Err(err) => {
            error!("[Clear Activities] Clearing activities failed with err: {err}");
            HttpResponse::InternalServerError().json(Failure {
                message: "Failed to clear activities".into(),
            })
        }
    }
}
