// src/services/prompt.rs
use crate::models::{AnalysisCategory, ThreatStatus};
use serde_json::{Value, json};

pub const CHAT_PERSONA: &str = "You are SENTINEL CORE, the resident AI of SAFECLICK. \
You reason about cyber threats with cold, precise logic. When explaining an attack, \
give actionable intelligence: how it works, how to spot it, what to do next. \
Walk victims through recovery steps with calm authority.";

pub fn system_instruction(category: AnalysisCategory, simplified_language: bool) -> String {
    let category_context = match category {
        AnalysisCategory::AutoDetect => {
            "First classify the medium of the input (URL, Email, or SMS/messaging), then audit it accordingly."
                .to_string()
        }
        other => format!("The input was submitted as: {}.", other.label()),
    };

    let register = if simplified_language {
        "Write the summary and suggestedActions in plain, simple language a non-expert can follow. Avoid jargon."
    } else {
        "Use precise, professional cybersecurity terminology."
    };

    let statuses = ThreatStatus::ALL
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are the SAFECLICK forensic engine. Produce a rigorous security audit of the submitted input.

Apply all three lenses:
1. REASONING CHAIN: work through the input step by step and record each deduction, in order, in reasoningSteps.
2. TECHNICAL AUDIT: look for typosquatting and lookalike names, disguised or redirecting links, character encoding tricks such as Punycode, and metadata anomalies. List them in technicalAudit.anomalies.
3. PSYCHOLOGICAL AUDIT: name the manipulation triggers present, such as Urgency, Fear, Authority, Scarcity, Social Proof, or Liking. List them in psychologicalAudit.triggers.

CATEGORY CONTEXT: {category_context}

{register}

OUTPUT RULES:
- riskLevel and both riskScore fields are integers from 0 (clearly safe) to 100 (critical, immediate threat).
- status is one of: {statuses}.
- Respond only with JSON matching the response schema."#
    )
}

/// Text part carrying the user's content verbatim.
pub fn scan_prompt(content: &str, has_image: bool) -> String {
    let mut prompt = String::from("Run a deep forensic scan on the following input.\n");
    prompt.push_str("CONTENT:\n\"\"\"\n");
    prompt.push_str(content);
    prompt.push_str("\n\"\"\"\n");
    if has_image {
        prompt.push_str("IMAGE: a screenshot is attached as the next part.\n");
    }
    prompt.push_str("Respond strictly in JSON following the schema.");
    prompt
}

/// Response shape enforced on the remote side; mirrors `AnalysisResult`.
pub fn analysis_response_schema() -> Value {
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });

    json!({
        "type": "OBJECT",
        "properties": {
            "status": {
                "type": "STRING",
                "enum": ThreatStatus::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>()
            },
            "riskLevel": { "type": "INTEGER" },
            "summary": { "type": "STRING" },
            "reasoningSteps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Ordered, step-by-step deductions leading to the verdict."
            },
            "technicalAudit": {
                "type": "OBJECT",
                "properties": {
                    "anomalies": string_list.clone(),
                    "riskScore": { "type": "INTEGER" }
                },
                "required": ["anomalies", "riskScore"]
            },
            "psychologicalAudit": {
                "type": "OBJECT",
                "properties": {
                    "triggers": string_list.clone(),
                    "riskScore": { "type": "INTEGER" }
                },
                "required": ["triggers", "riskScore"]
            },
            "suggestedActions": string_list
        },
        "required": [
            "status",
            "riskLevel",
            "summary",
            "reasoningSteps",
            "technicalAudit",
            "psychologicalAudit",
            "suggestedActions"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;

    #[test]
    fn auto_detect_asks_for_classification() {
        let instruction = system_instruction(AnalysisCategory::AutoDetect, false);
        assert!(instruction.contains("First classify the medium"));
        assert!(instruction.contains("professional cybersecurity terminology"));

        let instruction = system_instruction(AnalysisCategory::Email, true);
        assert!(!instruction.contains("First classify the medium"));
        assert!(instruction.contains("submitted as: Email"));
        assert!(instruction.contains("plain, simple language"));
    }

    #[test]
    fn instruction_names_all_lenses_and_triggers() {
        let instruction = system_instruction(AnalysisCategory::Url, false);
        for needle in ["REASONING CHAIN", "TECHNICAL AUDIT", "PSYCHOLOGICAL AUDIT", "Punycode"] {
            assert!(instruction.contains(needle), "missing {}", needle);
        }
        for trigger in ["Urgency", "Authority", "Scarcity", "Social Proof"] {
            assert!(instruction.contains(trigger), "missing {}", trigger);
        }
        assert!(instruction.contains("Safe, Suspicious, Dangerous"));
    }

    #[test]
    fn scan_prompt_embeds_content_verbatim() {
        let content = "Your account is locked, click here: http://bit.ly/xyz";
        let prompt = scan_prompt(content, false);
        assert!(prompt.contains(content));
        assert!(!prompt.contains("screenshot"));
        assert!(scan_prompt("", true).contains("screenshot is attached"));
    }

    #[test]
    fn schema_requires_every_result_field() {
        let schema = analysis_response_schema();
        let sample = serde_json::to_value(AnalysisResult::fallback()).unwrap();

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let fields: Vec<&String> = sample.as_object().unwrap().keys().collect();
        assert_eq!(required.len(), fields.len());
        for field in fields {
            assert!(required.contains(&field.as_str()), "{} not required", field);
            assert!(schema["properties"].get(field).is_some());
        }

        assert_eq!(
            schema["properties"]["status"]["enum"],
            serde_json::json!(["Safe", "Suspicious", "Dangerous"])
        );
        assert_eq!(
            schema["properties"]["technicalAudit"]["required"],
            serde_json::json!(["anomalies", "riskScore"])
        );
    }
}
