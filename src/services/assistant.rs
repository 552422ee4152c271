//! AI 助手应答编排
//!
//! 算式走本地求值，其余问题交给外部生成服务；服务失败时按语言回退到固定应答。
//! `try_answer` 保留完整的错误信息，`answer` 把所有错误折叠成可展示的文本，
//! 对调用方没有错误通道。算式失败统一返回主语言的固定提示，不区分错误类型。

use crate::models::UserRole;
use crate::services::expression::{self, ExpressionError};
use crate::services::fallback::CannedResponseTable;
use crate::services::gemini::{AiRequest, CompletionClient, ServiceError};
use crate::services::language::{self, SupportedLanguage};
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

/// 算式无法求值时的固定提示
pub const MATH_FAILURE_MESSAGE: &str =
    "Не удалось вычислить выражение. Пожалуйста, проверьте синтаксис.";

/// 内部应答错误，不会暴露给最终调用方
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("math evaluation failed: {0}")]
    Expression(#[from] ExpressionError),

    #[error("external service failed ({language}): {source}")]
    ExternalService {
        language: SupportedLanguage,
        #[source]
        source: ServiceError,
    },
}

/// 应答编排器，可在多个请求间共享
#[derive(Clone)]
pub struct Assistant {
    client: Arc<dyn CompletionClient>,
    responses: Arc<CannedResponseTable>,
}

impl Assistant {
    /// 使用内置回退表
    pub fn new<C>(client: C) -> Self
    where
        C: CompletionClient + 'static,
    {
        Self::with_responses(client, Arc::new(CannedResponseTable::builtin()))
    }

    pub fn with_responses<C>(client: C, responses: Arc<CannedResponseTable>) -> Self
    where
        C: CompletionClient + 'static,
    {
        Self {
            client: Arc::new(client),
            responses,
        }
    }

    /// 回答问题，任何情况下都返回文本
    pub async fn answer(&self, question: &str, role: &str) -> String {
        info!("AI assistance request: {} (role: {})", question, role);

        match self.try_answer(question, role).await {
            Ok(text) => text,
            Err(AnswerError::Expression(e)) => {
                warn!("Math evaluation error: {}", e);
                MATH_FAILURE_MESSAGE.to_string()
            }
            Err(AnswerError::ExternalService { language, source }) => {
                warn!("External service failed, using {} fallback: {}", language, source);
                self.responses.fallback(question, language).to_string()
            }
        }
    }

    /// 回答问题，保留失败原因
    pub async fn try_answer(&self, question: &str, role: &str) -> Result<String, AnswerError> {
        if expression::is_arithmetic(question) {
            let value = expression::evaluate_expression(question)?;
            return Ok(expression::format_number(value));
        }

        let language = language::detect_language(question);
        debug!("Detected language: {}", language);

        let request = AiRequest::new(question, UserRole::parse(role));
        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|source| AnswerError::ExternalService { language, source })?;

        Ok(response.text)
    }
}
