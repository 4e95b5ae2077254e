// tests/analysis_scenarios.rs
use async_trait::async_trait;
use safeclick::config::ModelSettings;
use safeclick::errors::SafeclickError;
use safeclick::models::{AnalysisCategory, AnalysisRequest, AnalysisResult, ThreatStatus};
use safeclick::services::AnalysisClient;
use safeclick::services::gemini::{GenerateContentRequest, GenerateContentResponse, ModelBackend};
use safeclick::state::{ConsoleAction, ConsoleState, reduce};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Reply {
    Json(serde_json::Value),
    Empty,
    TransportError,
}

struct MockRemote {
    reply: Reply,
    calls: AtomicUsize,
}

impl MockRemote {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for MockRemote {
    async fn generate(
        &self,
        _model: &str,
        _request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SafeclickError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Json(value) => Ok(GenerateContentResponse::from_text(value.to_string())),
            Reply::Empty => Ok(GenerateContentResponse::from_text("")),
            Reply::TransportError => Err(SafeclickError::Transport("connection refused".to_string())),
        }
    }
}

fn client(remote: Arc<MockRemote>) -> AnalysisClient {
    AnalysisClient::new(remote, ModelSettings::default())
}

fn assert_fallback(result: &AnalysisResult) {
    assert_eq!(result.status, ThreatStatus::Suspicious);
    assert_eq!(result.risk_level, 50);
    assert_eq!(result.technical_audit.risk_score, 50);
    assert_eq!(result.psychological_audit.risk_score, 50);
    assert!(!result.reasoning_steps.is_empty());
    assert!(!result.technical_audit.anomalies.is_empty());
    assert!(!result.psychological_audit.triggers.is_empty());
    assert!(!result.suggested_actions.is_empty());
    assert_eq!(result, &AnalysisResult::fallback());
}

#[tokio::test]
async fn locked_account_lure_is_returned_unchanged() {
    let payload = json!({
        "status": "Dangerous",
        "riskLevel": 92,
        "summary": "Account-lock lure pointing at a shortened link.",
        "reasoningSteps": [
            "Claims the account is locked to force a reaction.",
            "The bit.ly link hides the real destination.",
            "No sender identity can be verified."
        ],
        "technicalAudit": { "anomalies": ["Shortened URL"], "riskScore": 85 },
        "psychologicalAudit": { "triggers": ["Urgency", "Fear", "Authority"], "riskScore": 94 },
        "suggestedActions": ["Do not click.", "Contact the provider through its official app."]
    });
    let remote = MockRemote::new(Reply::Json(payload.clone()));

    let request = AnalysisRequest::text("Your account is locked, click here: http://bit.ly/xyz")
        .with_category(AnalysisCategory::AutoDetect);
    let result = client(remote.clone()).analyze(&request).await.unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), payload);
    assert_eq!(result.reasoning_steps[1], "The bit.ly link hides the real destination.");
    assert_eq!(remote.calls(), 1);
}

#[tokio::test]
async fn transport_error_yields_fallback() {
    let remote = MockRemote::new(Reply::TransportError);
    let result = client(remote.clone())
        .analyze(&AnalysisRequest::text("hello"))
        .await
        .unwrap();

    assert_fallback(&result);
    assert_eq!(remote.calls(), 1);
}

#[tokio::test]
async fn empty_response_yields_fallback() {
    let remote = MockRemote::new(Reply::Empty);
    let result = client(remote).analyze(&AnalysisRequest::text("hello")).await.unwrap();
    assert_fallback(&result);
}

#[tokio::test]
async fn empty_request_is_rejected_without_network() {
    let remote = MockRemote::new(Reply::Json(json!({})));
    let err = client(remote.clone())
        .analyze(&AnalysisRequest::text(""))
        .await
        .unwrap_err();

    assert!(matches!(err, SafeclickError::InvalidRequest(_)));
    assert_eq!(remote.calls(), 0);
}

#[tokio::test]
async fn empty_chat_reply_becomes_fixed_line() {
    let remote = MockRemote::new(Reply::Empty);
    let reply = client(remote).converse("what is phishing?", &[]).await.unwrap();
    assert_eq!(reply, "Neural link unstable. Please retry.");
}

#[tokio::test]
async fn console_round_trip_through_client() {
    let remote = MockRemote::new(Reply::TransportError);
    let client = client(remote);

    let state = [
        ConsoleAction::EditDraftText("Win a free iPhone, reply YES".to_string()),
        ConsoleAction::SetCategory(AnalysisCategory::SmsOrMessaging),
        ConsoleAction::AnalysisStarted,
    ]
    .into_iter()
    .fold(ConsoleState::default(), reduce);
    assert!(state.analysis_in_progress);

    let result = client.analyze(&state.draft_request()).await.unwrap();
    let state = reduce(state, ConsoleAction::AnalysisFinished(result));
    assert!(!state.analysis_in_progress);
    assert_fallback(state.last_result.as_ref().unwrap());

    let state = reduce(state, ConsoleAction::ChatSubmitted("is this a scam?".to_string()));
    let reply = client
        .converse("is this a scam?", state.chat_context())
        .await
        .unwrap();
    let state = reduce(state, ConsoleAction::ChatReplied(reply));
    assert_eq!(
        state.chat.last().unwrap().text,
        "Error encountered in processing core."
    );
}
