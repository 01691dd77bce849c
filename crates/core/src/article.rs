use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::{LogLevel, LogRecord, LogSink};
use crate::model::{strip_code_fences, ChatMessage, ChatModel, ChatModelError, ChatRequest};
use crate::prompts::{PromptError, PromptRegistry};

/// Drafting uses a higher temperature than evaluation: some variation
/// between regenerations is desirable.
pub const WRITER_TEMPERATURE: f32 = 0.7;

/// The structured article produced by the writer stage. Every field is
/// defaulted so a model reply missing one degrades to empty instead of
/// failing the whole draft.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleDraft {
    #[serde(default)]
    pub title_candidates: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub lead: String,
    #[serde(default)]
    pub article_body: String,
    #[serde(default)]
    pub structure: Vec<String>,
}

impl ArticleDraft {
    /// Title shown in contexts that need a single title.
    pub fn primary_title(&self) -> Option<&str> {
        self.title_candidates
            .iter()
            .map(|title| title.trim())
            .find(|title| !title.is_empty())
    }

    /// Manual paste path: wraps a pasted body (and optional title) in the
    /// structured shape so downstream stages see a uniform draft.
    pub fn from_manual(title: Option<String>, body: String) -> Self {
        let title_candidates = match title {
            Some(title) if !title.trim().is_empty() => vec![title],
            _ => vec!["無題".to_string()],
        };
        Self {
            title_candidates,
            article_body: body,
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("プロンプトの構築に失敗しました: {0}")]
    Prompt(#[from] PromptError),
    #[error("LLM の呼び出しに失敗しました: {0}")]
    Model(#[from] ChatModelError),
    #[error("LLM が空の応答を返しました")]
    EmptyResponse,
    #[error("記事 JSON の解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Writer stage: survey text in, structured article draft out.
pub struct WriterService<'a> {
    prompts: &'a PromptRegistry,
    sink: &'a dyn LogSink,
}

impl<'a> WriterService<'a> {
    pub fn new(prompts: &'a PromptRegistry, sink: &'a dyn LogSink) -> Self {
        Self { prompts, sink }
    }

    pub fn generate<M: ChatModel + ?Sized>(
        &self,
        model: &M,
        survey_data: &str,
    ) -> Result<ArticleDraft, WriterError> {
        let system = self.prompts.format_with::<_, &str, &str>("writer_system", [])?;
        let instruction = self
            .prompts
            .format_with("writer_instruction", [("survey_data", survey_data.trim())])?;

        self.log(LogLevel::Info, "記事草稿を生成しています...");
        self.log(
            LogLevel::Debug,
            format!("ライターへの指示:\n{instruction}"),
        );

        let request = ChatRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(instruction),
        ])
        .with_temperature(WRITER_TEMPERATURE)
        .with_json_mode(true);

        let response = model.complete(&request)?;
        self.log(
            LogLevel::Debug,
            format!("ライターからの応答:\n{response}"),
        );

        let cleaned = strip_code_fences(&response);
        if cleaned.is_empty() {
            self.log(LogLevel::Warn, "記事生成に失敗しました。応答が空です。");
            return Err(WriterError::EmptyResponse);
        }

        let draft: ArticleDraft = serde_json::from_str(&cleaned)?;
        self.log(
            LogLevel::Info,
            format!(
                "記事草稿の生成が完了しました（タイトル案 {} 件、本文 {} 文字）。",
                draft.title_candidates.len(),
                draft.article_body.chars().count()
            ),
        );
        Ok(draft)
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.sink.log(LogRecord::new(level, message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogSink;
    use crate::model::Role;
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

    const STUB_DRAFT: &str = r###"{
        "title_candidates": ["高校生の7割がInstagramを利用"],
        "summary": "要約",
        "lead": "リード文",
        "article_body": "## はじめに\n\n本文",
        "structure": ["はじめに", "結果", "まとめ"]
    }"###;

    #[test]
    fn generates_draft_from_stub_response() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let model = CapturingModel::new(STUB_DRAFT);

        let service = WriterService::new(&prompts, &sink);
        let draft = service.generate(&model, "Q1: Instagram 68%").unwrap();

        assert_eq!(draft.article_body, "## はじめに\n\n本文");
        assert_eq!(draft.primary_title(), Some("高校生の7割がInstagramを利用"));
        assert_eq!(draft.structure.len(), 3);

        let request = model.last_request.lock().unwrap().clone().unwrap();
        assert!(request.json_mode);
        assert_eq!(request.temperature, Some(WRITER_TEMPERATURE));
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[1].content.contains("Q1: Instagram 68%"));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let fenced = format!("```json\n{STUB_DRAFT}\n```");
        let model = CapturingModel::new(fenced);

        let service = WriterService::new(&prompts, &sink);
        let draft = service.generate(&model, "survey").unwrap();
        assert_eq!(draft.summary, "要約");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let model = CapturingModel::new("記事を書きました（JSONではない）");

        let service = WriterService::new(&prompts, &sink);
        let error = service.generate(&model, "survey").unwrap_err();
        assert!(matches!(error, WriterError::Parse(_)));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let prompts = PromptRegistry::new().unwrap();
        let sink = MemoryLogSink::new();
        let model = CapturingModel::new(r#"{"article_body": "本文のみ"}"#);

        let service = WriterService::new(&prompts, &sink);
        let draft = service.generate(&model, "survey").unwrap();
        assert_eq!(draft.article_body, "本文のみ");
        assert!(draft.title_candidates.is_empty());
        assert_eq!(draft.primary_title(), None);
    }

    #[test]
    fn manual_draft_falls_back_to_placeholder_title() {
        let draft = ArticleDraft::from_manual(None, "本文".into());
        assert_eq!(draft.primary_title(), Some("無題"));
    }
}
