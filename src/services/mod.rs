// 服务模块
// 提供 AI 助手核心业务逻辑

pub mod assistant;
pub mod database;
pub mod expression;
pub mod fallback;
pub mod gemini;
pub mod language;

pub use assistant::{
    AnswerError,
    Assistant,
    MATH_FAILURE_MESSAGE,
};

pub use database::{
    HistoryStore,
    DEFAULT_HISTORY_LIMIT,
};

pub use expression::{
    evaluate,
    evaluate_expression,
    format_number,
    is_arithmetic,
    to_postfix,
    tokenize,
    ExpressionError,
    Operator,
    Token,
    Tokens,
};

pub use fallback::{
    CannedEntry,
    CannedResponseTable,
    LanguageResponses,
};

pub use gemini::{
    AiRequest,
    AiResponse,
    AssistantPrompt,
    CompletionClient,
    ConfigError,
    GeminiClient,
    GeminiConfig,
    ServiceError,
};

pub use language::{
    detect_language,
    LanguageMarkers,
    SupportedLanguage,
    KAZAKH_MARKERS,
};
