use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::logging::{LogLevel, LogRecord, LogSink};
use crate::model::{strip_code_fences, ChatMessage, ChatModel, ChatModelError, ChatRequest};
use crate::prompts::{PromptError, PromptRegistry};

/// Evaluation runs colder than drafting: repeated runs over the same
/// draft should score consistently.
pub const EVALUATOR_TEMPERATURE: f32 = 0.3;

/// Maximum total: eight axes, five points each.
pub const MAX_TOTAL_SCORE: u32 = 40;

/// The eight fixed evaluation axes with their display labels, in display
/// order. Rendering iterates this table and skips axes the model did not
/// return.
pub const AXES: [(&str, &str); 8] = [
    ("naturalness_teen", "10代自然さ"),
    ("readability", "わかりやすさ"),
    ("structure", "記事構成"),
    ("bias_assertion", "偏り・断定"),
    ("ethics_safety", "倫理・配慮"),
    ("seo_basics", "SEO基礎"),
    ("brand_fit", "ブランド整合"),
    ("data_integrity", "データ整合性"),
];

pub fn axis_label(key: &str) -> Option<&'static str> {
    AXES.iter()
        .find(|(axis, _)| *axis == key)
        .map(|(_, label)| *label)
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

/// One concrete improvement proposal. The model uses either the
/// before/after pair or the issue/suggestion pair depending on whether it
/// shows a rewrite or raises a point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The editor-in-chief's verdict. `total_score` is display-only and is
/// passed through as received, never recomputed from `scores`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
    #[serde(default)]
    pub summary: EvaluationSummary,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
}

impl Evaluation {
    /// Axes present in the verdict, in the fixed display order, as
    /// (label, score) pairs. Absent axes are omitted rather than failing.
    pub fn labeled_scores(&self) -> Vec<(&'static str, u32)> {
        AXES.iter()
            .filter_map(|(key, label)| self.scores.get(*key).map(|score| (*label, *score)))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("プロンプトの構築に失敗しました: {0}")]
    Prompt(#[from] PromptError),
    #[error("LLM の呼び出しに失敗しました: {0}")]
    Model(#[from] ChatModelError),
    #[error("LLM が空の応答を返しました")]
    EmptyResponse,
    #[error("評価 JSON の解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Evaluator stage: survey text plus the current draft in, eight-axis
/// verdict out.
pub struct EvaluatorService<'a> {
    prompts: &'a PromptRegistry,
    sink: &'a dyn LogSink,
}

impl<'a> EvaluatorService<'a> {
    pub fn new(prompts: &'a PromptRegistry, sink: &'a dyn LogSink) -> Self {
        Self { prompts, sink }
    }

    pub fn evaluate<M: ChatModel + ?Sized>(
        &self,
        model: &M,
        survey_data: &str,
        article_title: &str,
        article_body: &str,
    ) -> Result<Evaluation, EvaluatorError> {
        let system = self
            .prompts
            .format_with::<_, &str, &str>("evaluator_system", [])?;
        let instruction = self.prompts.format_with(
            "evaluator_instruction",
            [
                ("survey_data", survey_data.trim()),
                ("article_title", article_title.trim()),
                ("article_body", article_body),
            ],
        )?;

        self.log(LogLevel::Info, "AI編集長が記事を評価しています...");
        self.log(
            LogLevel::Debug,
            format!("評価への入力:\n{instruction}"),
        );

        let request = ChatRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(instruction),
        ])
        .with_temperature(EVALUATOR_TEMPERATURE)
        .with_json_mode(true);

        let response = model.complete(&request)?;
        self.log(
            LogLevel::Debug,
            format!("評価の応答:\n{response}"),
        );

        let cleaned = strip_code_fences(&response);
        if cleaned.is_empty() {
            self.log(LogLevel::Warn, "評価に失敗しました。応答が空です。");
            return Err(EvaluatorError::EmptyResponse);
        }

        let evaluation: Evaluation = serde_json::from_str(&cleaned)?;
        self.log(
            LogLevel::Info,
            match evaluation.total_score {
                Some(total) => format!("評価が完了しました（総合 {total}/{MAX_TOTAL_SCORE}）。"),
                None => "評価が完了しました。".to_string(),
            },
        );
        Ok(evaluation)
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.sink.log(LogRecord::new(level, message.into()));
    }
}
