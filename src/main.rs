// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

use safeclick::config::Config;
use safeclick::services::{AnalysisClient, ImageProcessor};
use safeclick::{AppState, configure};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting SafeClick service...");

    let config = Config::from_env().context("invalid configuration")?;
    let analysis_client =
        Arc::new(AnalysisClient::from_config(&config).context("failed to build analysis client")?);
    let image_processor = Arc::new(ImageProcessor::new(config.max_image_dimension));

    info!(
        "Analysis model: {}, chat model: {}",
        config.models.analysis_model, config.models.chat_model
    );

    let app_state = AppState {
        analysis_client,
        image_processor,
    };
    let static_dir = config.static_dir.clone();

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().limit(20 * 1024 * 1024))
            .wrap(middleware::Logger::default())
            .configure(configure);

        match &static_dir {
            Some(dir) => app.service(actix_files::Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}
