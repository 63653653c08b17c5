//! Error types / 错误类型

use thiserror::Error;

/// Errors raised by the search core and its storage adapters / 搜索核心与存储适配器的错误
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("popularity table line {line}: {reason}")]
    PopularityTable { line: usize, reason: String },

    #[error("store error: {0}")]
    Store(String),
}

impl SearchError {
    /// SQLite 锁冲突，可以重试
    pub fn is_locked(&self) -> bool {
        match self {
            SearchError::Database(e) => {
                let msg = e.to_string();
                msg.contains("database is locked") || msg.contains("SQLITE_BUSY")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
