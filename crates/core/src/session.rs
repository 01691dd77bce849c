use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::article::ArticleDraft;
use crate::editor::ChatTurn;
use crate::evaluation::Evaluation;

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("セッションファイルへのアクセスに失敗しました: {0}")]
    Io(#[from] std::io::Error),
    #[error("セッションファイルの解析に失敗しました: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The operator's working state, one slot per stage. Each stage writes
/// only its own slots; nothing here is cleared implicitly, so a stale
/// evaluation or chat can outlive the draft it was made for (accepted
/// behavior — regeneration does not cascade).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub survey_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<ArticleDraft>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(default)]
    pub chat: Vec<ChatTurn>,
    /// Shadow copy of the article body being revised. Starts as the
    /// draft body and is only changed by an explicit save or a chat
    /// reset; assistant replies never overwrite it automatically.
    #[serde(default)]
    pub current_article: String,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_survey(&mut self, survey_data: impl Into<String>) {
        self.survey_data = survey_data.into();
    }

    pub fn has_survey(&self) -> bool {
        !self.survey_data.trim().is_empty()
    }

    pub fn has_article(&self) -> bool {
        !self.current_article.trim().is_empty()
    }

    /// Writer stage result: fully replaces the draft slot and resets the
    /// shadow copy to the new body. Evaluation and chat are left as-is.
    pub fn replace_draft(&mut self, draft: ArticleDraft) {
        self.current_article = draft.article_body.clone();
        self.draft = Some(draft);
    }

    /// Evaluator stage result: fully replaces the previous verdict.
    pub fn replace_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.chat.push(turn);
    }

    /// Clears the transcript and restores the shadow copy to the last
    /// generated/pasted draft body.
    pub fn reset_chat(&mut self) {
        self.chat.clear();
        self.current_article = self
            .draft
            .as_ref()
            .map(|draft| draft.article_body.clone())
            .unwrap_or_default();
    }

    pub fn primary_title(&self) -> Option<&str> {
        self.draft.as_ref().and_then(|draft| draft.primary_title())
    }
}

/// Persists the session under a workspace directory so consecutive
/// `yaectl` invocations operate on the same editorial session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
    state: SessionState,
}

impl SessionStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = dir.into();
        let path = dir.join(SESSION_FILE_NAME);
        let state = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            SessionState::default()
        };

        Ok(Self { dir, state })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn save(&self) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir)?;
        let serialized = serde_json::to_string_pretty(&self.state)?;
        fs::write(self.path(), serialized)?;
        Ok(())
    }
}
