//! AI 助手命令模块
//! 提问、算式求值和历史查询

use crate::models::{AiInteraction, AskQuestionRequest};
use crate::services::database::{HistoryStore, DEFAULT_HISTORY_LIMIT};
use crate::services::{expression, Assistant};
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub assistant: Assistant,
    pub history: Option<HistoryStore>,
}

impl AppState {
    pub fn new(assistant: Assistant, history: Option<HistoryStore>) -> Self {
        Self { assistant, history }
    }
}

/// 问答记录传输对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionDto {
    pub id: Option<String>,
    pub question: String,
    pub response: String,
    pub created_at: String,
}

impl From<AiInteraction> for InteractionDto {
    fn from(interaction: AiInteraction) -> Self {
        Self {
            id: Some(interaction.id),
            question: interaction.question,
            response: interaction.response,
            created_at: interaction.created_at.to_rfc3339(),
        }
    }
}

/// 向 AI 助手提问，并尽量保存记录
pub async fn ask_question(
    state: &AppState,
    user_id: &str,
    role: &str,
    request: AskQuestionRequest,
) -> Result<InteractionDto, String> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err("Question is required".to_string());
    }

    let response = state.assistant.answer(question, role).await;

    // 保存失败不影响返回的答案
    if let Some(history) = &state.history {
        match history.record(user_id, question, &response) {
            Ok(interaction) => return Ok(interaction.into()),
            Err(e) => warn!("Error saving AI interaction: {:#}", e),
        }
    }

    Ok(InteractionDto {
        id: None,
        question: question.to_string(),
        response,
        created_at: Utc::now().to_rfc3339(),
    })
}

/// 只走算式路径
pub fn evaluate_math(expression_text: &str) -> Result<String, String> {
    expression::evaluate_expression(expression_text)
        .map(expression::format_number)
        .map_err(|e| e.to_string())
}

/// 获取用户问答历史
pub fn get_history(
    state: &AppState,
    user_id: &str,
    limit: Option<u32>,
) -> Result<Vec<InteractionDto>, String> {
    let history = state
        .history
        .as_ref()
        .ok_or_else(|| "History storage is disabled".to_string())?;

    let interactions = history
        .history(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .map_err(|e| e.to_string())?;

    Ok(interactions.into_iter().map(InteractionDto::from).collect())
}
