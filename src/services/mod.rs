// src/services/mod.rs
pub mod analysis_client;
pub mod gemini;
pub mod image_processor;
pub mod prompt;

pub use analysis_client::AnalysisClient;
pub use gemini::{GeminiBackend, ModelBackend};
pub use image_processor::ImageProcessor;
