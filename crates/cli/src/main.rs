use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use yae_adapters::{create_chat_adapter, AdapterError};
use yae_core::{
    render_markdown, ArticleDraft, ChatMessage, ChatModelError, ChatRequest, ChatTurn,
    ConfigError, ConfigStore, EditorError, EditorService, EvaluatorError, EvaluatorService,
    LogLevel, LogRecord, LogSink, PromptError, PromptRegistry, Role, SampleError, SampleLibrary,
    SessionError, SessionStore, StdoutLogSink, WriterError, WriterService, MAX_TOTAL_SCORE,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("エラー: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let sink = StdoutLogSink::new();
    let ctx = CliContext {
        config_path: cli.config,
        workspace: cli.workspace,
    };

    match cli.command {
        Command::Config(command) => handle_config(&ctx, command, &sink),
        Command::Survey(command) => handle_survey(&ctx, command, &sink),
        Command::Sample(command) => handle_sample(&ctx, command, &sink),
        Command::Article(command) => handle_article(&ctx, command, &sink),
        Command::Evaluate(command) => handle_evaluate(&ctx, command, &sink),
        Command::Chat(command) => handle_chat(&ctx, command, &sink),
        Command::Export(command) => handle_export(&ctx, command, &sink),
    }
}

struct CliContext {
    config_path: PathBuf,
    workspace: Option<PathBuf>,
}

impl CliContext {
    fn open_config(&self) -> Result<ConfigStore, CliError> {
        let mut store = ConfigStore::open(self.config_path.clone())?;
        store.ensure_recent_defaults();
        Ok(store)
    }

    /// `--workspace` beats the configured `editorial.workspace`.
    fn resolve_workspace(&self, store: &ConfigStore) -> Result<PathBuf, CliError> {
        if let Some(dir) = &self.workspace {
            return Ok(dir.clone());
        }
        let configured = store.config().editorial.workspace.trim();
        if configured.is_empty() {
            Err(CliError::MissingWorkspace)
        } else {
            Ok(PathBuf::from(configured))
        }
    }

    fn open_session(&self, store: &ConfigStore) -> Result<SessionStore, CliError> {
        let dir = self.resolve_workspace(store)?;
        Ok(SessionStore::open(dir)?)
    }

    fn resolve_samples_dir(&self, store: &ConfigStore, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| PathBuf::from(store.config().editorial.samples_dir.clone()))
    }
}

fn handle_config(
    ctx: &CliContext,
    command: ConfigCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::TestLlm(args) => run_test_llm(ctx, args, sink),
    }
}

fn handle_survey(
    ctx: &CliContext,
    command: SurveyCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        SurveyCommand::Set(args) => run_survey_set(ctx, args, sink),
        SurveyCommand::Show => run_survey_show(ctx),
    }
}

fn handle_sample(
    ctx: &CliContext,
    command: SampleCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        SampleCommand::List(args) => run_sample_list(ctx, args),
        SampleCommand::Load(args) => run_sample_load(ctx, args, sink),
    }
}

fn handle_article(
    ctx: &CliContext,
    command: ArticleCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        ArticleCommand::Generate(args) => run_article_generate(ctx, args, sink),
        ArticleCommand::Set(args) => run_article_set(ctx, args, sink),
        ArticleCommand::Show => run_article_show(ctx),
    }
}

fn handle_evaluate(
    ctx: &CliContext,
    command: EvaluateCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        EvaluateCommand::Run(args) => run_evaluate(ctx, args, sink),
    }
}

fn handle_chat(
    ctx: &CliContext,
    command: ChatCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        ChatCommand::Send(args) => run_chat_send(ctx, args, sink),
        ChatCommand::Show => run_chat_show(ctx),
        ChatCommand::Reset(args) => run_chat_reset(ctx, args, sink),
    }
}

fn handle_export(
    ctx: &CliContext,
    command: ExportCommand,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    match command {
        ExportCommand::Write(args) => run_export_write(ctx, args, sink),
    }
}

fn run_test_llm(ctx: &CliContext, args: TestLlmArgs, sink: &dyn LogSink) -> Result<(), CliError> {
    let mut store = ctx.open_config()?;

    let selected = select_llm_interface(&store, args.interface)?;
    let profile = store
        .config()
        .get_llm_profile(&selected)
        .cloned()
        .ok_or_else(|| CliError::UnknownInterface(selected.clone()))?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!("LLM 設定をテストしています: {selected}"),
    ));
    sink.log(LogRecord::new(
        LogLevel::Debug,
        format!(
            "モデル: {} | 接続方式: {} | Base URL: {}",
            profile.model_name, profile.interface_format, profile.base_url
        ),
    ));

    let adapter = create_chat_adapter(store.config(), &selected)?;
    sink.log(LogRecord::new(
        LogLevel::Info,
        "テストメッセージを送信します: Please reply 'OK'".to_string(),
    ));

    let request = ChatRequest::new(vec![ChatMessage::user("Please reply 'OK'")]);
    match adapter.complete(&request) {
        Ok(response) => {
            if response.trim().is_empty() {
                sink.log(LogRecord::new(
                    LogLevel::Error,
                    "❌ LLM 設定のテストに失敗しました: 応答がありません".to_string(),
                ));
                return Err(CliError::TestFailed(
                    "LLM 設定のテストに失敗しました: 応答がありません".to_string(),
                ));
            }

            sink.log(LogRecord::new(
                LogLevel::Info,
                "✅ LLM 設定のテストに成功しました！".to_string(),
            ));
            sink.log(LogRecord::new(
                LogLevel::Debug,
                format!("テスト応答: {response}"),
            ));
        }
        Err(err) => {
            sink.log(LogRecord::new(
                LogLevel::Error,
                format!("❌ LLM 設定のテストでエラーが発生しました: {err}"),
            ));
            return Err(CliError::Model(err));
        }
    }

    store.touch_llm_interface(selected);
    store.save()?;

    Ok(())
}

fn run_survey_set(ctx: &CliContext, args: SurveyArgs, sink: &dyn LogSink) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let survey = read_text_input(args.file, args.text)?;

    let mut session = ctx.open_session(&store)?;
    session.state_mut().set_survey(survey);
    session.save()?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!(
            "アンケートデータを保存しました（{} 文字）: {}",
            session.state().survey_data.chars().count(),
            session.path().display()
        ),
    ));
    Ok(())
}

fn run_survey_show(ctx: &CliContext) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let session = ctx.open_session(&store)?;
    if !session.state().has_survey() {
        return Err(CliError::MissingSurveyData);
    }
    println!("{}", session.state().survey_data);
    Ok(())
}

fn run_sample_list(ctx: &CliContext, args: SampleListArgs) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let dir = ctx.resolve_samples_dir(&store, args.dir);
    let library = SampleLibrary::load(&dir)?;

    if library.is_empty() {
        println!(
            "サンプルが見つかりません: {}（*.md ファイルを配置してください）",
            dir.display()
        );
        return Ok(());
    }

    for name in library.names() {
        println!("{name}");
    }
    Ok(())
}

fn run_sample_load(
    ctx: &CliContext,
    args: SampleLoadArgs,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let dir = ctx.resolve_samples_dir(&store, args.dir);
    let library = SampleLibrary::load(&dir)?;
    let content = library
        .get(&args.name)
        .ok_or_else(|| CliError::UnknownSample {
            name: args.name.clone(),
            dir: dir.clone(),
        })?;

    let mut session = ctx.open_session(&store)?;
    session.state_mut().set_survey(content);
    session.save()?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!(
            "サンプル `{}` をアンケートデータとして読み込みました（{} 文字）。",
            args.name,
            content.chars().count()
        ),
    ));
    Ok(())
}

fn run_article_generate(
    ctx: &CliContext,
    args: GenerateArgs,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    let mut store = ctx.open_config()?;
    let mut session = ctx.open_session(&store)?;

    if !session.state().has_survey() {
        return Err(CliError::MissingSurveyData);
    }

    let selected = select_llm_interface(&store, args.llm_interface)?;
    let prompts = PromptRegistry::from_prompt_config(&store.config().prompts)?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!("使用する LLM 接続: {selected}"),
    ));

    let adapter = create_chat_adapter(store.config(), &selected)?;
    let writer = WriterService::new(&prompts, sink);
    let draft = writer.generate(adapter.as_ref(), &session.state().survey_data)?;

    print_draft(&draft);

    session.state_mut().replace_draft(draft);
    session.save()?;

    store.touch_llm_interface(selected);
    store.save()?;

    Ok(())
}

fn run_article_set(
    ctx: &CliContext,
    args: ArticleSetArgs,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let body = read_text_input(args.file, args.text)?;
    let draft = ArticleDraft::from_manual(args.title, body);

    let mut session = ctx.open_session(&store)?;
    session.state_mut().replace_draft(draft);
    session.save()?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!(
            "記事を差し替えました（{} 文字）。",
            session.state().current_article.chars().count()
        ),
    ));
    Ok(())
}

fn run_article_show(ctx: &CliContext) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let session = ctx.open_session(&store)?;
    if !session.state().has_article() {
        return Err(CliError::MissingArticle);
    }

    if let Some(title) = session.state().primary_title() {
        println!("# {title}\n");
    }
    println!("{}", session.state().current_article);
    Ok(())
}

fn run_evaluate(ctx: &CliContext, args: GenerateArgs, sink: &dyn LogSink) -> Result<(), CliError> {
    let mut store = ctx.open_config()?;
    let mut session = ctx.open_session(&store)?;

    if !session.state().has_article() {
        return Err(CliError::MissingArticle);
    }

    let selected = select_llm_interface(&store, args.llm_interface)?;
    let prompts = PromptRegistry::from_prompt_config(&store.config().prompts)?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!("使用する LLM 接続: {selected}"),
    ));

    let adapter = create_chat_adapter(store.config(), &selected)?;
    let evaluator = EvaluatorService::new(&prompts, sink);
    let title = session
        .state()
        .primary_title()
        .unwrap_or_default()
        .to_string();
    let evaluation = evaluator.evaluate(
        adapter.as_ref(),
        &session.state().survey_data,
        &title,
        &session.state().current_article,
    )?;

    print_evaluation(&evaluation);

    session.state_mut().replace_evaluation(evaluation);
    session.save()?;

    store.touch_llm_interface(selected);
    store.save()?;

    Ok(())
}

fn run_chat_send(ctx: &CliContext, args: ChatSendArgs, sink: &dyn LogSink) -> Result<(), CliError> {
    let mut store = ctx.open_config()?;
    let mut session = ctx.open_session(&store)?;

    if !session.state().has_article() {
        return Err(CliError::MissingArticle);
    }

    let selected = select_llm_interface(&store, args.llm_interface)?;
    let prompts = PromptRegistry::from_prompt_config(&store.config().prompts)?;
    let adapter = create_chat_adapter(store.config(), &selected)?;

    let editor = EditorService::new(&prompts, sink);
    let turn = editor.compose_user_turn(
        &session.state().chat,
        &session.state().survey_data,
        &session.state().current_article,
        session.state().evaluation.as_ref(),
        &args.message,
    )?;

    // The user turn is persisted before the model call: a failure leaves
    // it in the transcript as an unanswered instruction.
    session.state_mut().push_turn(turn);
    session.save()?;

    let reply = editor.send(adapter.as_ref(), &session.state().chat)?;
    println!("{reply}");

    session.state_mut().push_turn(ChatTurn::assistant(reply));
    session.save()?;

    store.touch_llm_interface(selected);
    store.save()?;

    Ok(())
}

fn run_chat_show(ctx: &CliContext) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let session = ctx.open_session(&store)?;

    if session.state().chat.is_empty() {
        println!("会話履歴はまだありません。");
        return Ok(());
    }

    for turn in &session.state().chat {
        let label = match turn.role {
            Role::User => "あなた",
            Role::Assistant => "AI編集者",
            Role::System => "システム",
        };
        println!("--- {label} ---");
        println!("{}\n", turn.content);
    }
    Ok(())
}

fn run_chat_reset(ctx: &CliContext, _args: ChatResetArgs, sink: &dyn LogSink) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let mut session = ctx.open_session(&store)?;

    session.state_mut().reset_chat();
    session.save()?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        "会話履歴をクリアし、記事を生成時の状態に戻しました。".to_string(),
    ));
    Ok(())
}

fn run_export_write(
    ctx: &CliContext,
    args: ExportWriteArgs,
    sink: &dyn LogSink,
) -> Result<(), CliError> {
    let store = ctx.open_config()?;
    let session = ctx.open_session(&store)?;

    if !session.state().has_article() {
        return Err(CliError::MissingArticle);
    }

    let date = chrono::Local::now().date_naive();
    let document = render_markdown(
        session.state().primary_title(),
        &session.state().current_article,
        date,
    );

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| CliError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(&args.out, &document).map_err(|source| CliError::Io {
        path: args.out.clone(),
        source,
    })?;

    sink.log(LogRecord::new(
        LogLevel::Info,
        format!("記事を書き出しました: {}", args.out.display()),
    ));
    Ok(())
}

fn print_draft(draft: &ArticleDraft) {
    if !draft.title_candidates.is_empty() {
        println!("## タイトル案");
        for (index, title) in draft.title_candidates.iter().enumerate() {
            println!("{}. {title}", index + 1);
        }
        println!();
    }
    if !draft.summary.trim().is_empty() {
        println!("## 要約\n{}\n", draft.summary);
    }
    if !draft.lead.trim().is_empty() {
        println!("## リード文\n{}\n", draft.lead);
    }
    if !draft.structure.is_empty() {
        println!("## 構成");
        for heading in &draft.structure {
            println!("- {heading}");
        }
        println!();
    }
    println!("## 本文\n{}", draft.article_body);
}

fn print_evaluation(evaluation: &yae_core::Evaluation) {
    println!("## 評価スコア");
    for (label, score) in evaluation.labeled_scores() {
        println!("{label}: {score}/5");
    }
    if let Some(total) = evaluation.total_score {
        println!("総合: {total}/{MAX_TOTAL_SCORE}");
    }

    if !evaluation.summary.strengths.is_empty() {
        println!("\n## 良い点");
        for item in &evaluation.summary.strengths {
            println!("- {item}");
        }
    }
    if !evaluation.summary.weaknesses.is_empty() {
        println!("\n## 改善点");
        for item in &evaluation.summary.weaknesses {
            println!("- {item}");
        }
    }

    if !evaluation.proposals.is_empty() {
        println!("\n## 改善提案");
        for proposal in &evaluation.proposals {
            if let Some(category) = &proposal.category {
                println!("[{category}]");
            }
            if let (Some(before), Some(after)) = (&proposal.before, &proposal.after) {
                println!("修正前: {before}");
                println!("修正後: {after}");
            }
            if let Some(issue) = &proposal.issue {
                println!("課題: {issue}");
            }
            if let Some(suggestion) = &proposal.suggestion {
                println!("提案: {suggestion}");
            }
            if let Some(reason) = &proposal.reason {
                println!("理由: {reason}");
            }
            println!();
        }
    }
}

fn read_text_input(file: Option<PathBuf>, text: Option<String>) -> Result<String, CliError> {
    match (file, text) {
        (Some(path), None) => fs::read_to_string(&path).map_err(|source| CliError::Io {
            path,
            source,
        }),
        (None, Some(text)) => Ok(text),
        _ => Err(CliError::MissingInput),
    }
}

fn select_llm_interface(
    store: &ConfigStore,
    preferred: Option<String>,
) -> Result<String, CliError> {
    if let Some(name) = normalize_preference(preferred) {
        if store.config().llm_profiles.contains_key(&name) {
            return Ok(name);
        }
        return Err(CliError::UnknownInterface(name));
    }

    if let Some(name) = store.last_llm_interface() {
        return Ok(name.to_string());
    }

    if let Some(name) = store.config().llm_profiles.keys().next() {
        return Ok(name.clone());
    }

    Err(CliError::MissingLlmProfile)
}

fn normalize_preference(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Error)]
enum CliError {
    #[error("設定ファイルエラー: {0}")]
    Config(#[from] ConfigError),
    #[error("セッションエラー: {0}")]
    Session(#[from] SessionError),
    #[error("サンプル読み込みエラー: {0}")]
    Sample(#[from] SampleError),
    #[error("プロンプトの読み込みに失敗しました: {0}")]
    Prompt(#[from] PromptError),
    #[error("記事生成に失敗しました: {0}")]
    Writer(#[from] WriterError),
    #[error("評価に失敗しました: {0}")]
    Evaluator(#[from] EvaluatorError),
    #[error("改善チャットに失敗しました: {0}")]
    Editor(#[from] EditorError),
    #[error("アダプタの初期化に失敗しました: {0}")]
    Adapter(#[from] AdapterError),
    #[error("LLM の呼び出しに失敗しました: {0}")]
    Model(#[from] ChatModelError),
    #[error("ファイル `{path}` の読み書きに失敗しました: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("作業ディレクトリが未設定です。config.json の editorial.workspace か --workspace を指定してください。")]
    MissingWorkspace,
    #[error("アンケートデータが設定されていません。先に `survey set` または `sample load` を実行してください。")]
    MissingSurveyData,
    #[error("記事がありません。先に `article generate` または `article set` を実行してください。")]
    MissingArticle,
    #[error("利用可能な LLM 設定がありません。config.json に llm_profiles を追加してください。")]
    MissingLlmProfile,
    #[error("`{0}` という名前の LLM 設定が見つかりません")]
    UnknownInterface(String),
    #[error("サンプル `{name}` が見つかりません: {dir}", dir = .dir.display())]
    UnknownSample { name: String, dir: PathBuf },
    #[error("--file か --text のいずれか一方を指定してください。")]
    MissingInput,
    #[error("{0}")]
    TestFailed(String),
}

#[derive(Parser)]
#[command(
    name = "yaectl",
    version,
    about = "YAE (Young AI Editor) コマンドラインツール"
)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// セッションを保存する作業ディレクトリ（editorial.workspace を上書き）
    #[arg(long, global = true, value_name = "DIR")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 設定関連の操作
    #[command(subcommand)]
    Config(ConfigCommand),
    /// アンケートデータの操作
    #[command(subcommand)]
    Survey(SurveyCommand),
    /// サンプルデータの操作
    #[command(subcommand)]
    Sample(SampleCommand),
    /// 記事の生成・差し替え・表示
    #[command(subcommand)]
    Article(ArticleCommand),
    /// AI編集長による記事評価
    #[command(subcommand)]
    Evaluate(EvaluateCommand),
    /// AI編集者との改善チャット
    #[command(subcommand)]
    Chat(ChatCommand),
    /// 記事の書き出し
    #[command(subcommand)]
    Export(ExportCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// LLM 接続設定をテストする
    TestLlm(TestLlmArgs),
}

#[derive(Subcommand)]
enum SurveyCommand {
    /// アンケートデータを設定する
    Set(SurveyArgs),
    /// 現在のアンケートデータを表示する
    Show,
}

#[derive(Subcommand)]
enum SampleCommand {
    /// サンプル一覧を表示する
    List(SampleListArgs),
    /// サンプルをアンケートデータとして読み込む
    Load(SampleLoadArgs),
}

#[derive(Subcommand)]
enum ArticleCommand {
    /// アンケートデータから記事を生成する
    Generate(GenerateArgs),
    /// 手元の記事で差し替える
    Set(ArticleSetArgs),
    /// 現在の記事を表示する
    Show,
}

#[derive(Subcommand)]
enum EvaluateCommand {
    /// 現在の記事を8軸で評価する
    Run(GenerateArgs),
}

#[derive(Subcommand)]
enum ChatCommand {
    /// 改善指示を送信する
    Send(ChatSendArgs),
    /// 会話履歴を表示する
    Show,
    /// 会話履歴をクリアし記事を元に戻す
    Reset(ChatResetArgs),
}

#[derive(Subcommand)]
enum ExportCommand {
    /// 現在の記事を Markdown として書き出す
    Write(ExportWriteArgs),
}

#[derive(Args)]
struct TestLlmArgs {
    /// テストする接続名（省略時は最近使用した接続）
    #[arg(long)]
    interface: Option<String>,
}

#[derive(Args)]
struct SurveyArgs {
    /// アンケートデータを含むファイル
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    file: Option<PathBuf>,
    /// アンケートデータを直接指定する
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,
}

#[derive(Args)]
struct SampleListArgs {
    /// サンプルディレクトリ（省略時は editorial.samples_dir）
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct SampleLoadArgs {
    /// 読み込むサンプル名（拡張子なし）
    #[arg(long)]
    name: String,
    /// サンプルディレクトリ（省略時は editorial.samples_dir）
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// 使用する LLM 接続名（省略時は最近使用した接続）
    #[arg(long)]
    llm_interface: Option<String>,
}

#[derive(Args)]
struct ArticleSetArgs {
    /// 記事本文を含むファイル
    #[arg(long, value_name = "FILE", conflicts_with = "text")]
    file: Option<PathBuf>,
    /// 記事本文を直接指定する
    #[arg(long, value_name = "TEXT")]
    text: Option<String>,
    /// 記事タイトル（省略時は「無題」）
    #[arg(long, value_name = "TEXT")]
    title: Option<String>,
}

#[derive(Args)]
struct ChatSendArgs {
    /// AI編集者への改善指示
    #[arg(long, value_name = "TEXT")]
    message: String,
    /// 使用する LLM 接続名（省略時は最近使用した接続）
    #[arg(long)]
    llm_interface: Option<String>,
}

#[derive(Args)]
struct ChatResetArgs {}

#[derive(Args)]
struct ExportWriteArgs {
    /// 書き出し先のファイルパス
    #[arg(long, value_name = "FILE")]
    out: PathBuf,
}
