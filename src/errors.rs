// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SafeclickError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ResponseError for SafeclickError {
    fn error_response(&self) -> HttpResponse {
        match self {
            SafeclickError::InvalidRequest(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid request",
                    "message": self.to_string()
                }))
            }
            SafeclickError::Transport(_) => {
                HttpResponse::ServiceUnavailable().json(serde_json::json!({
                    "error": "AI service error",
                    "message": self.to_string()
                }))
            }
            SafeclickError::SchemaViolation(_) => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "Malformed AI response",
                    "message": self.to_string()
                }))
            }
            SafeclickError::ImageProcessing(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Image processing error",
                    "message": self.to_string()
                }))
            }
            SafeclickError::Config(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Configuration error",
                    "message": self.to_string()
                }))
            }
            SafeclickError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Validation error",
                "message": self.to_string()
            })),
        }
    }
}
