// 数据库服务模块
// 保存 AI 助手的问答记录，供历史查询使用

use crate::models::AiInteraction;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// 历史查询默认条数
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// 问答历史存储
#[derive(Clone)]
pub struct HistoryStore {
    pool: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl HistoryStore {
    /// 打开（必要时创建）数据库文件
    pub fn open(db_path: &Path) -> Result<Self> {
        // 确保数据目录存在
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?;

        let store = Self {
            pool: Arc::new(Mutex::new(conn)),
            db_path: Some(db_path.to_path_buf()),
        };
        store.initialize()?;
        Ok(store)
    }

    /// 内存数据库
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            pool: Arc::new(Mutex::new(Connection::open_in_memory()?)),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.pool
            .lock()
            .map_err(|_| anyhow!("history database lock poisoned"))
    }

    /// 初始化表结构
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ai_assistant (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                question TEXT NOT NULL,
                response TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_ai_assistant_user_created
                ON ai_assistant(user_id, created_at);",
        )?;

        Ok(())
    }

    /// 记录一次问答
    pub fn record(&self, user_id: &str, question: &str, response: &str) -> Result<AiInteraction> {
        let interaction = AiInteraction {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question: question.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ai_assistant (id, user_id, question, response, created_at)
             VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                interaction.id,
                interaction.user_id,
                interaction.question,
                interaction.response,
                interaction.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ],
        )?;

        Ok(interaction)
    }

    /// 按时间倒序获取用户历史
    pub fn history(&self, user_id: &str, limit: u32) -> Result<Vec<AiInteraction>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, question, response, created_at
             FROM ai_assistant WHERE user_id = ?
             ORDER BY created_at DESC LIMIT ?",
        )?;

        let rows = stmt.query_map(rusqlite::params![user_id, limit], Self::row_to_interaction)?;

        let mut interactions = Vec::new();
        for row in rows {
            interactions.push(row?);
        }

        Ok(interactions)
    }

    fn row_to_interaction(row: &Row) -> rusqlite::Result<AiInteraction> {
        let created_at: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?
            .with_timezone(&Utc);

        Ok(AiInteraction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            question: row.get(2)?,
            response: row.get(3)?,
            created_at,
        })
    }
}
