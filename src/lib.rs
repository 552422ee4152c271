pub mod commands;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

pub use models::{AiInteraction, AskQuestionRequest, UserRole};
pub use services::{
    Assistant, CannedResponseTable, CompletionClient, GeminiClient, GeminiConfig, HistoryStore,
    SupportedLanguage,
};
