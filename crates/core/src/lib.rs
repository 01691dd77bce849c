pub mod article;
pub mod config;
pub mod editor;
pub mod evaluation;
pub mod export;
pub mod logging;
pub mod model;
pub mod prompts;
pub mod samples;
pub mod session;

pub use article::{ArticleDraft, WriterError, WriterService, WRITER_TEMPERATURE};
pub use config::{
    Config, ConfigError, ConfigStore, EditorialConfig, LlmConfig, PromptConfig, RecentUsage,
    API_KEY_ENV,
};
pub use editor::{
    evaluation_summary_text, ChatTurn, EditorError, EditorService, EDITOR_TEMPERATURE,
};
pub use evaluation::{
    axis_label, Evaluation, EvaluationSummary, EvaluatorError, EvaluatorService, Proposal, AXES,
    EVALUATOR_TEMPERATURE, MAX_TOTAL_SCORE,
};
pub use export::render_markdown;
pub use logging::{
    LogLevel, LogRecord, LogSink, MemoryLogSink, NullLogSink, SharedLogSink, StdoutLogSink,
};
pub use model::{
    strip_code_fences, ChatMessage, ChatModel, ChatModelError, ChatRequest, Role,
};
pub use prompts::{PromptArguments, PromptError, PromptRegistry, PromptTemplate};
pub use samples::{SampleError, SampleLibrary};
pub use session::{SessionError, SessionState, SessionStore, SESSION_FILE_NAME};
