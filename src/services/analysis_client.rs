// src/services/analysis_client.rs
use crate::config::{Config, ModelSettings};
use crate::errors::SafeclickError;
use crate::models::*;
use crate::services::gemini::{
    Content, GeminiBackend, GenerateContentRequest, GenerationConfig, ModelBackend, Part,
    ThinkingConfig,
};
use crate::services::prompt;
use log::{debug, info, warn};
use std::sync::Arc;

pub const CHAT_EMPTY_REPLY: &str = "Neural link unstable. Please retry.";
pub const CHAT_TRANSPORT_FAILURE: &str = "Error encountered in processing core.";

/// Client for the threat analyzer and the Sentinel chat.
///
/// Holds no per-call state: every `analyze` or `converse` is one independent
/// round trip, so a single instance is shared across all handlers.
pub struct AnalysisClient {
    backend: Arc<dyn ModelBackend>,
    settings: ModelSettings,
}

impl AnalysisClient {
    pub fn new(backend: Arc<dyn ModelBackend>, settings: ModelSettings) -> Self {
        Self { backend, settings }
    }

    pub fn from_config(config: &Config) -> Result<Self, SafeclickError> {
        let backend = GeminiBackend::new(
            config.api_key.clone(),
            config.api_base.clone(),
            config.request_timeout,
        )?;
        Ok(Self::new(Arc::new(backend), config.models.clone()))
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Audits the request with the remote model.
    ///
    /// Only a request with neither text nor image is an error; any transport
    /// or payload failure yields [`AnalysisResult::fallback`].
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, SafeclickError> {
        request.validate()?;

        let outbound = self.build_analysis_request(request);
        debug!(
            "Analysis request: category={}, image={}, simplified={}",
            request.category.label(),
            request.image.is_some(),
            request.simplified_language
        );

        let response = match self
            .backend
            .generate(&self.settings.analysis_model, &outbound)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Analysis transport failed, using fallback verdict: {}", e);
                return Ok(AnalysisResult::fallback());
            }
        };

        match parse_analysis_payload(&response.text()) {
            Ok(result) => {
                info!(
                    "Analysis complete: status={}, risk={}",
                    result.status.as_str(),
                    result.risk_level
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Analysis payload rejected, using fallback verdict: {}", e);
                Ok(AnalysisResult::fallback())
            }
        }
    }

    /// Asks the Sentinel persona a free-text question.
    ///
    /// A blank message is rejected before anything is sent. An empty reply or
    /// a transport failure is replaced by a fixed user-facing line.
    pub async fn converse(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, SafeclickError> {
        if message.trim().is_empty() {
            return Err(SafeclickError::InvalidRequest(
                "chat message is empty".to_string(),
            ));
        }

        let outbound = build_chat_request(message, history);
        match self
            .backend
            .generate(&self.settings.chat_model, &outbound)
            .await
        {
            Ok(response) => {
                let reply = response.text();
                if reply.trim().is_empty() {
                    warn!("Chat reply was empty");
                    Ok(CHAT_EMPTY_REPLY.to_string())
                } else {
                    Ok(reply)
                }
            }
            Err(e) => {
                warn!("Chat transport failed: {}", e);
                Ok(CHAT_TRANSPORT_FAILURE.to_string())
            }
        }
    }

    fn build_analysis_request(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        let mut parts = vec![Part::text(prompt::scan_prompt(
            &request.content,
            request.image.is_some(),
        ))];
        if let Some(image) = &request.image {
            parts.push(Part::inline(&image.data, &image.media_type));
        }

        GenerateContentRequest {
            system_instruction: Content::system(prompt::system_instruction(
                request.category,
                request.simplified_language,
            )),
            contents: vec![Content::user(parts)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompt::analysis_response_schema()),
                thinking_config: self
                    .settings
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            }),
        }
    }
}

fn build_chat_request(message: &str, history: &[ChatTurn]) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history
        .iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .map(|turn| match turn.role {
            ChatRole::User => Content::user(vec![Part::text(turn.text.clone())]),
            ChatRole::Assistant => Content::model(turn.text.clone()),
        })
        .collect();
    contents.push(Content::user(vec![Part::text(message)]));

    GenerateContentRequest {
        system_instruction: Content::system(prompt::CHAT_PERSONA),
        contents,
        generation_config: None,
    }
}

/// Decodes the model's JSON payload into a result, unchanged.
pub fn parse_analysis_payload(payload: &str) -> Result<AnalysisResult, SafeclickError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(SafeclickError::SchemaViolation(
            "empty analysis payload".to_string(),
        ));
    }
    serde_json::from_str(trimmed)
        .map_err(|e| SafeclickError::SchemaViolation(format!("Failed to parse analysis JSON: {}", e)))
}
