//! Record storage adapters / 记录存储适配器
//!
//! The search core only needs equality lookups on stored tokens and a way to
//! persist a record together with its token set. Adapters decide how many
//! rows a lookup may scan and own write serialization for a single record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::PersonRecord;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteRegistry;

/// Default number of rows a single token lookup may return / 单次查询默认上限
pub const DEFAULT_SCAN_CAP: usize = 500;

/// Per-repository index statistics / 索引统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub record_count: u64,
    pub token_count: u64,
    pub last_updated: Option<i64>,
}

/// Record store interface (provides only primitive operations) / 记录存储接口
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store name, for logs / 存储名称
    fn name(&self) -> &str;

    /// Maximum number of records returned by one lookup / 单次查询返回上限
    fn scan_cap(&self) -> usize;

    /// Records in `repo` whose token set contains `token`, at most `scan_cap` / 按 token 精确查找
    async fn lookup_by_token(&self, repo: &str, token: &str) -> Result<Vec<PersonRecord>>;

    /// Insert or replace a record and its token set / 写入记录及其 token
    async fn put(&self, record: &PersonRecord) -> Result<()>;

    /// Index statistics for a repository / 统计信息
    async fn stats(&self, repo: &str) -> Result<IndexStats>;
}
