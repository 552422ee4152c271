use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 提问者角色，只影响提示词措辞
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// 未知角色按学生处理
    pub fn parse(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "teacher" => UserRole::Teacher,
            "admin" => UserRole::Admin,
            _ => UserRole::Student,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
}

/// 一次问答记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInteraction {
    pub id: String,
    pub user_id: String,
    pub question: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}
