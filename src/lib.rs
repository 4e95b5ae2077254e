// src/lib.rs
use actix_web::web;
use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use crate::services::{AnalysisClient, ImageProcessor};

#[derive(Clone)]
pub struct AppState {
    pub analysis_client: Arc<AnalysisClient>,
    pub image_processor: Arc<ImageProcessor>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/analyze", web::post().to(handlers::analyze))
            .route("/analyze/upload", web::post().to(handlers::analyze_upload))
            .route("/chat", web::post().to(handlers::chat)),
    )
    .route("/health", web::get().to(handlers::health_check));
}
