//! Gemini 生成服务模块
//! 提供外部文本生成能力，包括配置、请求/响应结构、提示词工程和 HTTP 客户端

use crate::models::UserRole;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{timeout, Duration};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-pro";

/// 配置错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid GEMINI_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),
}

/// 外部服务调用错误
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response payload: {0}")]
    InvalidPayload(String),

    #[error("service error {code} ({status}): {message}")]
    Api {
        code: i64,
        message: String,
        status: String,
    },

    #[error("service returned no candidates")]
    EmptyResponse,
}

/// Gemini 配置
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
            temperature: 0.5,
            max_output_tokens: 1024,
            top_p: 0.8,
            top_k: 40,
        }
    }
}

impl GeminiConfig {
    /// 从环境变量读取配置，缺少密钥时直接失败
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self {
            api_key,
            ..Self::default()
        };

        if let Some(base_url) = lookup("GEMINI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(raw) = lookup("GEMINI_TIMEOUT_SECS") {
            config.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
        }

        Ok(config)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

// ==================== 请求/响应结构 ====================

/// 单次外部调用的请求
#[derive(Debug, Clone)]
pub struct AiRequest {
    pub question: String,
    pub role: UserRole,
    pub prompt: String,
}

impl AiRequest {
    pub fn new(question: &str, role: UserRole) -> Self {
        Self {
            question: question.to_string(),
            role,
            prompt: AssistantPrompt::build(question, role),
        }
    }
}

/// 单次外部调用的应答
#[derive(Debug, Clone, PartialEq)]
pub struct AiResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

pub const SAFETY_SETTINGS: [SafetySetting; 2] = [
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
];

/// generateContent 请求体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// generateContent 响应体
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

/// 解析响应体，取第一个候选的第一段文本
pub fn parse_response(body: &str) -> Result<AiResponse, ServiceError> {
    let payload: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::InvalidPayload(e.to_string()))?;

    if let Some(error) = payload.error {
        return Err(ServiceError::Api {
            code: error.code,
            message: error.message,
            status: error.status,
        });
    }

    let text = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ServiceError::EmptyResponse)?;

    Ok(AiResponse { text })
}

// ==================== 提示词 ====================

/// 助手提示词工程
pub struct AssistantPrompt;

impl AssistantPrompt {
    const PREAMBLE: &'static str = "Ты - образовательный ассистент платформы Shabyt для подготовки к ЕНТ (Единому Национальному Тестированию) в Казахстане.
Отвечай на вопросы студентов по школьной программе.
Будь полезным, информативным и точным.
Если ты не знаешь ответа, так и скажи.
Отвечай на том же языке, на котором задан вопрос: на русском или на казахском.";

    const ELEVATED: &'static str = "Вопрос задает преподаватель. Можешь давать методические рекомендации, помогать составлять уроки и тестовые задания, приводить более подробные объяснения.";

    pub fn build(question: &str, role: UserRole) -> String {
        let mut prompt = String::from(Self::PREAMBLE);

        if role.is_elevated() {
            prompt.push('\n');
            prompt.push_str(Self::ELEVATED);
        }

        prompt.push_str("\nВопрос: ");
        prompt.push_str(question);
        prompt
    }
}

// ==================== 客户端 ====================

/// 文本生成服务接口
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &AiRequest) -> Result<AiResponse, ServiceError>;
}

#[async_trait]
impl<T> CompletionClient for Arc<T>
where
    T: CompletionClient + ?Sized,
{
    async fn complete(&self, request: &AiRequest) -> Result<AiResponse, ServiceError> {
        (**self).complete(request).await
    }
}

/// Gemini HTTP 客户端
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// 构建请求体
    pub fn build_body(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
            safety_settings: SAFETY_SETTINGS.to_vec(),
        }
    }

    fn map_transport(&self, error: reqwest::Error) -> ServiceError {
        if error.is_timeout() {
            ServiceError::Timeout(self.config.timeout_secs)
        } else {
            ServiceError::Transport(error.to_string())
        }
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<AiResponse, ServiceError> {
        let response = self
            .http_client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&text)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &AiRequest) -> Result<AiResponse, ServiceError> {
        let body = self.build_body(&request.prompt);
        let limit = Duration::from_secs(self.config.timeout_secs);

        timeout(limit, self.send(&body))
            .await
            .map_err(|_| ServiceError::Timeout(self.config.timeout_secs))?
    }
}
