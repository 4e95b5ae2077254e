// src/state.rs
//! Console state for the frontend: tabs, theme, analyzer draft, chat transcript.
//!
//! The state is a plain value; every user action goes through [`reduce`], which
//! returns the next state without side effects. Network calls happen outside
//! and report back with `AnalysisFinished` / `ChatReplied`.
use crate::models::{AnalysisCategory, AnalysisRequest, AnalysisResult, ChatTurn, ImageAttachment};
use serde::{Deserialize, Serialize};

pub const CHAT_GREETING: &str =
    "Sentinel Core Online. I am SAFECLICK AI. How can I assist your defense today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Home,
    Awareness,
    Attacks,
    Legal,
    Analyzer,
    Chatbot,
    Resources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
    CyberBlue,
    NeonGreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisDraft {
    pub text: String,
    pub image: Option<ImageAttachment>,
    pub category: AnalysisCategory,
    pub simplified_language: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleState {
    pub active_tab: Tab,
    pub theme: Theme,
    pub report_modal_open: bool,
    pub draft: AnalysisDraft,
    pub analysis_in_progress: bool,
    pub last_result: Option<AnalysisResult>,
    pub chat: Vec<ChatTurn>,
    pub awaiting_reply: bool,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            active_tab: Tab::default(),
            theme: Theme::default(),
            report_modal_open: false,
            draft: AnalysisDraft::default(),
            analysis_in_progress: false,
            last_result: None,
            chat: vec![ChatTurn::assistant(CHAT_GREETING)],
            awaiting_reply: false,
        }
    }
}

impl ConsoleState {
    /// The request the analyzer would send for the current draft.
    pub fn draft_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            content: self.draft.text.clone(),
            category: self.draft.category,
            image: self.draft.image.clone(),
            simplified_language: self.draft.simplified_language,
        }
    }

    pub fn can_start_analysis(&self) -> bool {
        !self.analysis_in_progress && self.draft_request().validate().is_ok()
    }

    /// Turns preceding the pending user message, used as chat context.
    pub fn chat_context(&self) -> &[ChatTurn] {
        match self.chat.split_last() {
            Some((_, earlier)) if self.awaiting_reply => earlier,
            _ => &self.chat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    SelectTab(Tab),
    SetTheme(Theme),
    OpenReportModal,
    CloseReportModal,
    EditDraftText(String),
    AttachImage(ImageAttachment),
    ClearImage,
    SetCategory(AnalysisCategory),
    SetSimplified(bool),
    AnalysisStarted,
    AnalysisFinished(AnalysisResult),
    ChatSubmitted(String),
    ChatReplied(String),
}

pub fn reduce(state: ConsoleState, action: ConsoleAction) -> ConsoleState {
    let mut next = state;
    match action {
        ConsoleAction::SelectTab(tab) => next.active_tab = tab,
        ConsoleAction::SetTheme(theme) => next.theme = theme,
        ConsoleAction::OpenReportModal => next.report_modal_open = true,
        ConsoleAction::CloseReportModal => next.report_modal_open = false,
        ConsoleAction::EditDraftText(text) => next.draft.text = text,
        ConsoleAction::AttachImage(image) => next.draft.image = Some(image),
        ConsoleAction::ClearImage => next.draft.image = None,
        ConsoleAction::SetCategory(category) => next.draft.category = category,
        ConsoleAction::SetSimplified(flag) => next.draft.simplified_language = flag,
        ConsoleAction::AnalysisStarted => {
            if next.can_start_analysis() {
                next.analysis_in_progress = true;
                next.last_result = None;
            }
        }
        ConsoleAction::AnalysisFinished(result) => {
            if next.analysis_in_progress {
                next.analysis_in_progress = false;
                next.last_result = Some(result);
            }
        }
        ConsoleAction::ChatSubmitted(text) => {
            if !text.trim().is_empty() && !next.awaiting_reply {
                next.chat.push(ChatTurn::user(text));
                next.awaiting_reply = true;
            }
        }
        ConsoleAction::ChatReplied(text) => {
            if next.awaiting_reply {
                next.chat.push(ChatTurn::assistant(text));
                next.awaiting_reply = false;
            }
        }
    }
    next
}
