// src/handlers.rs
use crate::{AppState, errors::SafeclickError, models::*};
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use log::info;
use serde::Deserialize;
use uuid::Uuid;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: AnalysisCategory,
    /// Data URL or bare base64.
    pub image: Option<String>,
    #[serde(default)]
    pub simplified_language: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

pub async fn analyze(
    body: web::Json<AnalyzeBody>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();

    let image = match body.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let (bytes, declared) = data.image_processor.decode_data_url(raw)?;
            Some(data.image_processor.prepare(&bytes, declared.as_deref())?)
        }
        None => None,
    };

    let request = AnalysisRequest {
        content: body.content,
        category: body.category,
        image,
        simplified_language: body.simplified_language,
    };

    Ok(run_analysis(&data, request).await?)
}

pub async fn analyze_upload(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let mut request = AnalysisRequest::default();
    let mut total = 0usize;

    while let Some(mut field) = payload.try_next().await? {
        let name = field
            .content_disposition()
            .get_name()
            .ok_or_else(|| SafeclickError::Validation("Multipart field without a name".to_string()))?
            .to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            total += chunk.len();
            if total > MAX_UPLOAD_BYTES {
                return Err(SafeclickError::Validation("Upload exceeds 20MB".to_string()).into());
            }
            buf.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "content" => request.content = field_text(&buf)?,
            "category" => request.category = AnalysisCategory::parse(&field_text(&buf)?)?,
            "simplifiedLanguage" => request.simplified_language = parse_flag(&field_text(&buf)?)?,
            "image" => {
                if !buf.is_empty() {
                    request.image = Some(data.image_processor.prepare(&buf, content_type.as_deref())?);
                }
            }
            other => {
                return Err(SafeclickError::Validation(format!("Unknown field: {}", other)).into());
            }
        }
    }

    Ok(run_analysis(&data, request).await?)
}

pub async fn chat(body: web::Json<ChatBody>, data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let reply = data.analysis_client.converse(&body.message, &body.history).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "reply": reply })))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "safeclick",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn run_analysis(data: &AppState, request: AnalysisRequest) -> Result<HttpResponse, SafeclickError> {
    let result = data.analysis_client.analyze(&request).await?;

    let record = AnalysisRecord {
        id: Uuid::new_v4(),
        model: data.analysis_client.settings().analysis_model.clone(),
        category: request.category,
        analyzed_at: chrono::Utc::now(),
        result,
    };
    info!("Analysis {} returned {}", record.id, record.result.status.as_str());

    Ok(HttpResponse::Ok().json(&record))
}

fn field_text(buf: &[u8]) -> Result<String, SafeclickError> {
    String::from_utf8(buf.to_vec())
        .map_err(|_| SafeclickError::Validation("Text field is not valid UTF-8".to_string()))
}

fn parse_flag(raw: &str) -> Result<bool, SafeclickError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "off" => Ok(false),
        "true" | "1" | "on" => Ok(true),
        other => Err(SafeclickError::Validation(format!("Invalid flag value: {}", other))),
    }
}
