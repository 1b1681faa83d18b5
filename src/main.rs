use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use actix_web_lab::web::spa;
use anyhow::Context;
use dotenvy::dotenv;
use log::info;
use qrlink::{config::Config, routes, store::MemStorage, types::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().context("Loading configuration")?;
    info!("Loaded configuration: {config:?}");

    let app_data = web::Data::new(AppState {
        store: Arc::new(MemStorage::new()),
        max_upload_bytes: config.max_upload_bytes,
    });
    info!("Initialized in-memory activity store");

    let dist_dir = config.dist_dir.to_string_lossy().into_owned();
    let index_file = config.dist_dir.join("index.html").to_string_lossy().into_owned();

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_data.clone())
            .configure(routes::configure)
            .service(
                spa()
                    .index_file(index_file.clone())
                    .static_resources_mount("/")
                    .static_resources_location(dist_dir.clone())
                    .finish(),
            )
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Binding {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
