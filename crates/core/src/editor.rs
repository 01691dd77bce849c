use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::Evaluation;
use crate::logging::{LogLevel, LogRecord, LogSink};
use crate::model::{ChatMessage, ChatModel, ChatModelError, ChatRequest, Role};
use crate::prompts::{PromptError, PromptRegistry};

pub const EDITOR_TEMPERATURE: f32 = 0.7;

const NO_EVALUATION_PLACEHOLDER: &str = "（評価未実施）";

/// One recorded message of the revision chat. The transcript is
/// append-only; every send replays it verbatim as conversation context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Evaluation summary as shown to the model in the chat context block.
pub fn evaluation_summary_text(evaluation: Option<&Evaluation>) -> String {
    match evaluation {
        Some(evaluation) => serde_json::to_string_pretty(&evaluation.summary)
            .unwrap_or_else(|_| NO_EVALUATION_PLACEHOLDER.to_string()),
        None => NO_EVALUATION_PLACEHOLDER.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("プロンプトの構築に失敗しました: {0}")]
    Prompt(#[from] PromptError),
    #[error("LLM の呼び出しに失敗しました: {0}")]
    Model(#[from] ChatModelError),
    #[error("LLM が空の応答を返しました")]
    EmptyResponse,
}

/// Editor stage: free-form revision chat over the current article.
///
/// The model has no memory of the writer/evaluator stages, so the first
/// recorded user turn carries a context block (survey, current article,
/// evaluation summary) in addition to the instruction; replaying the
/// transcript verbatim then keeps the context available on every later
/// turn. The transcript grows without bound by design.
pub struct EditorService<'a> {
    prompts: &'a PromptRegistry,
    sink: &'a dyn LogSink,
}

impl<'a> EditorService<'a> {
    pub fn new(prompts: &'a PromptRegistry, sink: &'a dyn LogSink) -> Self {
        Self { prompts, sink }
    }

    /// Builds the user turn to record for `instruction`. On the first
    /// turn of a session the context block is bundled in front of the
    /// instruction; later turns record the instruction as-is.
    pub fn compose_user_turn(
        &self,
        transcript: &[ChatTurn],
        survey_data: &str,
        current_article: &str,
        evaluation: Option<&Evaluation>,
        instruction: &str,
    ) -> Result<ChatTurn, EditorError> {
        if !transcript.is_empty() {
            return Ok(ChatTurn::user(instruction));
        }

        let context = self.prompts.format_with(
            "editor_context",
            [
                ("survey_data", survey_data),
                ("current_article", current_article),
                (
                    "evaluation_summary",
                    evaluation_summary_text(evaluation).as_str(),
                ),
            ],
        )?;
        Ok(ChatTurn::user(format!("{context}\n\n{instruction}")))
    }

    /// The outgoing message list for a send: the fixed editor system
    /// prompt followed by the full transcript in original order.
    pub fn build_messages(&self, transcript: &[ChatTurn]) -> Result<Vec<ChatMessage>, EditorError> {
        let system = self
            .prompts
            .format_with::<_, &str, &str>("editor_system", [])?;
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(system));
        for turn in transcript {
            messages.push(ChatMessage::new(turn.role, turn.content.clone()));
        }
        Ok(messages)
    }

    /// Sends the transcript (whose last turn is the pending user
    /// instruction) and returns the assistant reply. The caller records
    /// the user turn before calling, so a failure here leaves a dangling
    /// unanswered user turn in the transcript — intentional.
    pub fn send<M: ChatModel + ?Sized>(
        &self,
        model: &M,
        transcript: &[ChatTurn],
    ) -> Result<String, EditorError> {
        let messages = self.build_messages(transcript)?;

        self.log(
            LogLevel::Info,
            format!(
                "AI編集者に送信しています（会話 {} ターン）...",
                transcript.len()
            ),
        );

        let request =
            ChatRequest::new(messages).with_temperature(EDITOR_TEMPERATURE);

        let response = model.complete(&request)?;
        if response.trim().is_empty() {
            self.log(LogLevel::Warn, "編集者の応答が空でした。");
            return Err(EditorError::EmptyResponse);
        }

        self.log(LogLevel::Debug, format!("編集者の応答:\n{response}"));
        Ok(response)
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.sink.log(LogRecord::new(level, message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogSink;
    use std::sync::Mutex;

    struct CapturingModel {
        response: String,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl CapturingModel {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                last_request: Mutex::new(None),
            }
        }
    }

    impl ChatModel for CapturingModel {
        fn complete(&self, request: &ChatRequest) -> Result<String, ChatModelError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn first_turn_bundles_context_block() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let service = EditorService::new(&prompts, &sink);

        let turn = service
            .compose_user_turn(&[], "Q1: 68%", "現在の記事本文", None, "タイトルを変えて")
            .unwrap();

        assert_eq!(turn.role, Role::User);
        assert!(turn.content.contains("【参考情報】"));
        assert!(turn.content.contains("Q1: 68%"));
        assert!(turn.content.contains("現在の記事本文"));
        assert!(turn.content.contains("（評価未実施）"));
        assert!(turn.content.ends_with("タイトルを変えて"));
    }

    #[test]
    fn later_turns_are_instruction_only() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let service = EditorService::new(&prompts, &sink);

        let transcript = vec![ChatTurn::user("最初"), ChatTurn::assistant("了解です")];
        let turn = service
            .compose_user_turn(&transcript, "調査", "記事", None, "もっと短く")
            .unwrap();
        assert_eq!(turn.content, "もっと短く");
    }

    #[test]
    fn outgoing_messages_replay_full_transcript_in_order() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let service = EditorService::new(&prompts, &sink);
        let model = CapturingModel::new("修正しました");

        let transcript = vec![
            ChatTurn::user("コンテキスト + 指示1"),
            ChatTurn::assistant("回答1"),
            ChatTurn::user("指示2"),
            ChatTurn::assistant("回答2"),
            ChatTurn::user("指示3"),
        ];

        let reply = service.send(&model, &transcript).unwrap();
        assert_eq!(reply, "修正しました");

        let request = model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.temperature, Some(EDITOR_TEMPERATURE));
        assert!(!request.json_mode);
        // system + all five recorded turns, order preserved
        assert_eq!(request.messages.len(), 6);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "コンテキスト + 指示1");
        assert_eq!(request.messages[5].content, "指示3");
        assert_eq!(request.messages[5].role, Role::User);
    }

    #[test]
    fn empty_reply_is_an_error() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let service = EditorService::new(&prompts, &sink);
        let model = CapturingModel::new("   ");

        let transcript = vec![ChatTurn::user("指示")];
        let error = service.send(&model, &transcript).unwrap_err();
        assert!(matches!(error, EditorError::EmptyResponse));
    }

    #[test]
    fn evaluation_summary_renders_as_json() {
        let mut evaluation = Evaluation::default();
        evaluation.summary.strengths.push("強み".into());
        let text = evaluation_summary_text(Some(&evaluation));
        assert!(text.contains("strengths"));
        assert!(text.contains("強み"));
    }
}
