use actix_web::web::{self, scope};

use crate::utils::json_error_handler;

pub mod deletes;
pub mod gets;
pub mod posts;

/// Mounts the `/api` surface. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(posts::generate_qr)
            .service(posts::decode_qr)
            .service(gets::get_activities)
            .service(deletes::clear_activities),
    );
}
