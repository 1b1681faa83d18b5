use actix_web::{HttpResponse, Responder, get};
use log::{error, info};

use crate::{
    store::DEFAULT_LIST_LIMIT,
    types::{AppData, Failure},
};

#[get("/activities")]
pub async fn get_activities(data: AppData) -> impl Responder {
    match data.store.list(DEFAULT_LIST_LIMIT) {
        Ok(activities) => {
            info!("[Get Activities] Returning {} activities", activities.len());
            HttpResponse::Ok().json(activities)
        }
        Err(err) => {
            error!("[Get Activities] Fetching activities failed with err: {err}");
            HttpResponse::InternalServerError().json(Failure {
                message: "Failed to fetch activities".into(),
            })
        }
    }
}
