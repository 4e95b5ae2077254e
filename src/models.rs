// src/models.rs
use crate::errors::SafeclickError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub const FALLBACK_RISK: i64 = 50;

/// Medium hint passed to the remote model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisCategory {
    #[default]
    #[serde(rename = "Auto-Detect", alias = "AutoDetect")]
    AutoDetect,
    #[serde(rename = "URL", alias = "Url")]
    Url,
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "SMS/WhatsApp", alias = "SmsOrMessaging")]
    SmsOrMessaging,
    #[serde(rename = "Image")]
    Image,
}

impl AnalysisCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisCategory::AutoDetect => "Auto-Detect",
            AnalysisCategory::Url => "URL",
            AnalysisCategory::Email => "Email",
            AnalysisCategory::SmsOrMessaging => "SMS/WhatsApp",
            AnalysisCategory::Image => "Image",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SafeclickError> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
            .map_err(|_| SafeclickError::Validation(format!("Unknown category: {}", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data: Vec<u8>,
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisRequest {
    pub content: String,
    pub category: AnalysisCategory,
    pub image: Option<ImageAttachment>,
    pub simplified_language: bool,
}

impl AnalysisRequest {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: AnalysisCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    pub fn simplified(mut self, simplified_language: bool) -> Self {
        self.simplified_language = simplified_language;
        self
    }

    /// A request must carry text or an image; whitespace-only text counts as none.
    pub fn validate(&self) -> Result<(), SafeclickError> {
        let has_text = !self.content.trim().is_empty();
        let has_image = self.image.as_ref().is_some_and(|img| !img.data.is_empty());
        if has_text || has_image {
            Ok(())
        } else {
            Err(SafeclickError::InvalidRequest(
                "analysis needs text content or an image".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatStatus {
    Safe,
    Suspicious,
    Dangerous,
}

impl ThreatStatus {
    pub const ALL: [ThreatStatus; 3] = [
        ThreatStatus::Safe,
        ThreatStatus::Suspicious,
        ThreatStatus::Dangerous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatStatus::Safe => "Safe",
            ThreatStatus::Suspicious => "Suspicious",
            ThreatStatus::Dangerous => "Dangerous",
        }
    }
}

/// Accepts `92` and `92.0` alike; fractional or out-of-range numbers are rejected.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 => {
            Ok(value as i64)
        }
        _ => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {}",
            number
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAudit {
    pub anomalies: Vec<String>,
    #[serde(deserialize_with = "whole_number")]
    pub risk_score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychologicalAudit {
    pub triggers: Vec<String>,
    #[serde(deserialize_with = "whole_number")]
    pub risk_score: i64,
}

/// Structured verdict returned by the remote model. Scores are passed through
/// exactly as received, so out-of-range values stay visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub status: ThreatStatus,
    #[serde(deserialize_with = "whole_number")]
    pub risk_level: i64,
    pub summary: String,
    #[serde(alias = "analyticalReasoning")]
    pub reasoning_steps: Vec<String>,
    pub technical_audit: TechnicalAudit,
    pub psychological_audit: PsychologicalAudit,
    pub suggested_actions: Vec<String>,
}

impl AnalysisResult {
    /// The fixed verdict used whenever the remote call or its payload fails.
    pub fn fallback() -> Self {
        Self {
            status: ThreatStatus::Suspicious,
            risk_level: FALLBACK_RISK,
            summary: "Scan interrupted before a verdict was reached. Treat this content with caution."
                .to_string(),
            reasoning_steps: vec![
                "The forensic scan could not be completed.".to_string(),
                "A conservative safety verdict was applied instead.".to_string(),
            ],
            technical_audit: TechnicalAudit {
                anomalies: vec!["Inconclusive".to_string()],
                risk_score: FALLBACK_RISK,
            },
            psychological_audit: PsychologicalAudit {
                triggers: vec!["Unknown manipulation pattern".to_string()],
                risk_score: FALLBACK_RISK,
            },
            suggested_actions: vec![
                "Do not interact with the content.".to_string(),
                "Report it to a security professional.".to_string(),
            ],
        }
    }
}

/// Envelope returned over HTTP around a single analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub model: String,
    pub category: AnalysisCategory,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(alias = "model")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
