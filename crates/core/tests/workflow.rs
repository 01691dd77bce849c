use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use chrono::NaiveDate;
use yae_core::{
    render_markdown, ChatModel, ChatModelError, ChatRequest, EditorService, EvaluatorService,
    MemoryLogSink, PromptRegistry, Role, SessionStore, WriterService,
};

struct MockChatModel {
    responses: Mutex<VecDeque<String>>,
}

impl MockChatModel {
    fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    fn assert_empty(&self) {
        let guard = self.responses.lock().expect("mock mutex poisoned");
        assert!(
            guard.is_empty(),
            "expected all mock responses to be consumed"
        );
    }
}

impl ChatModel for MockChatModel {
    fn complete(&self, _request: &ChatRequest) -> Result<String, ChatModelError> {
        let mut guard = self.responses.lock().expect("mock mutex poisoned");
        guard.pop_front().ok_or_else(|| {
            ChatModelError::new(io::Error::other(
                "mock chat model has no remaining responses",
            ))
        })
    }
}

/// Always-failing model for the dangling-turn scenario.
struct FailingChatModel;

impl ChatModel for FailingChatModel {
    fn complete(&self, _request: &ChatRequest) -> Result<String, ChatModelError> {
        Err(ChatModelError::new(io::Error::other("接続エラー")))
    }
}

const SURVEY: &str = "Q1: SNSで最もよく使うのは？\nA1: Instagram 68%、X 21%、TikTok 9%";

const WRITER_RESPONSE: &str = r###"{
    "title_candidates": ["高校生の7割がInstagramを利用", "10代のSNS事情"],
    "summary": "高校生のSNS利用実態をまとめた記事。",
    "lead": "みなさんは毎日どのSNSを開いていますか？",
    "article_body": "## はじめに\n\n高校生の約7割がInstagramを利用しています。",
    "structure": ["はじめに", "調査結果", "まとめ"]
}"###;

const EVALUATOR_RESPONSE: &str = r#"{
    "scores": {
        "naturalness_teen": 4,
        "readability": 4,
        "structure": 3,
        "bias_assertion": 4,
        "ethics_safety": 5,
        "seo_basics": 3,
        "brand_fit": 4,
        "data_integrity": 3
    },
    "total_score": 30,
    "summary": {"strengths": ["データ引用が正確"], "weaknesses": ["見出しが弱い"]},
    "proposals": [
        {"category": "見出し", "before": "はじめに", "after": "7割がインスタ派！", "reason": "具体性"}
    ]
}"#;

#[test]
fn full_editorial_pipeline_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let prompts = PromptRegistry::new()?;
    let sink = MemoryLogSink::new();

    let mock = MockChatModel::new([
        WRITER_RESPONSE,
        EVALUATOR_RESPONSE,
        "タイトル案を3つ考えました。",
        "2案目をさらに短くしました。",
    ]);

    let mut store = SessionStore::open(temp.path())?;
    store.state_mut().set_survey(SURVEY);
    store.save()?;

    // Writer stage
    let writer = WriterService::new(&prompts, &sink);
    let draft = writer.generate(&mock, &store.state().survey_data)?;
    assert_eq!(
        draft.article_body,
        "## はじめに\n\n高校生の約7割がInstagramを利用しています。"
    );
    store.state_mut().replace_draft(draft);
    store.save()?;

    // Evaluator stage
    let evaluator = EvaluatorService::new(&prompts, &sink);
    let title = store.state().primary_title().unwrap_or_default().to_string();
    let evaluation = evaluator.evaluate(
        &mock,
        &store.state().survey_data,
        &title,
        &store.state().current_article,
    )?;
    assert_eq!(evaluation.total_score, Some(30));
    assert_eq!(evaluation.summary.weaknesses, vec!["見出しが弱い".to_string()]);
    assert_eq!(evaluation.labeled_scores().len(), 8);
    store.state_mut().replace_evaluation(evaluation);
    store.save()?;

    // Editor stage, two turns
    let editor = EditorService::new(&prompts, &sink);

    let first = editor.compose_user_turn(
        &store.state().chat,
        &store.state().survey_data,
        &store.state().current_article,
        store.state().evaluation.as_ref(),
        "タイトルをもっとキャッチーにして",
    )?;
    assert!(first.content.contains("【参考情報】"));
    store.state_mut().push_turn(first);
    let reply = editor.send(&mock, &store.state().chat)?;
    store.state_mut().push_turn(yae_core::ChatTurn::assistant(reply));
    store.save()?;

    let second = editor.compose_user_turn(
        &store.state().chat,
        &store.state().survey_data,
        &store.state().current_article,
        store.state().evaluation.as_ref(),
        "2案目を短くして",
    )?;
    assert_eq!(second.content, "2案目を短くして");
    store.state_mut().push_turn(second);
    let reply = editor.send(&mock, &store.state().chat)?;
    store.state_mut().push_turn(yae_core::ChatTurn::assistant(reply));
    store.save()?;

    assert_eq!(store.state().chat.len(), 4);

    // Session survives a reopen
    let mut reopened = SessionStore::open(temp.path())?;
    assert_eq!(reopened.state().chat.len(), 4);
    assert_eq!(
        reopened.state().chat[3].content,
        "2案目をさらに短くしました。"
    );

    // Reset restores the draft body
    reopened.state_mut().current_article = "チャット中に書き換えた本文".into();
    reopened.state_mut().reset_chat();
    assert!(reopened.state().chat.is_empty());
    assert_eq!(
        reopened.state().current_article,
        "## はじめに\n\n高校生の約7割がInstagramを利用しています。"
    );

    // Export template
    let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
    let document = render_markdown(
        reopened.state().primary_title(),
        &reopened.state().current_article,
        date,
    );
    assert!(document.starts_with("# 高校生の7割がInstagramを利用\n\n"));
    assert!(document.ends_with("---\n生成日: 2026-08-25\nYAE (Young AI Editor) で生成\n"));

    mock.assert_empty();
    Ok(())
}

#[test]
fn parse_failure_leaves_session_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let prompts = PromptRegistry::new()?;
    let sink = MemoryLogSink::new();

    let mut store = SessionStore::open(temp.path())?;
    store.state_mut().set_survey(SURVEY);
    store.save()?;
    let before = store.state().clone();

    let mock = MockChatModel::new(["JSONではない応答です"]);
    let writer = WriterService::new(&prompts, &sink);
    assert!(writer.generate(&mock, &store.state().survey_data).is_err());

    // nothing was written back
    assert_eq!(store.state(), &before);
    let reopened = SessionStore::open(temp.path())?;
    assert_eq!(reopened.state(), &before);
    Ok(())
}

#[test]
fn gateway_failure_leaves_dangling_user_turn() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempfile::tempdir()?;
    let prompts = PromptRegistry::new()?;
    let sink = MemoryLogSink::new();

    let mut store = SessionStore::open(temp.path())?;
    store.state_mut().set_survey(SURVEY);
    store.state_mut().replace_draft(yae_core::ArticleDraft::from_manual(
        Some("タイトル".into()),
        "本文".into(),
    ));

    let editor = EditorService::new(&prompts, &sink);
    let turn = editor.compose_user_turn(
        &store.state().chat,
        &store.state().survey_data,
        &store.state().current_article,
        None,
        "短くして",
    )?;
    store.state_mut().push_turn(turn);
    store.save()?;

    assert!(editor.send(&FailingChatModel, &store.state().chat).is_err());

    // the user turn stays recorded with no assistant reply
    let reopened = SessionStore::open(temp.path())?;
    assert_eq!(reopened.state().chat.len(), 1);
    assert_eq!(reopened.state().chat[0].role, Role::User);
    Ok(())
}
