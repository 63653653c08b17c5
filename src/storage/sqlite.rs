//! SQLite registry store / SQLite 登记库存储
//!
//! Storage layout:
//! - `persons`: one row per record (repo + record_id primary key)
//! - `person_tokens`: one row per (repo, token, record_id), the lookup index
//!
//! Features:
//! - WAL mode + busy_timeout (concurrent readers while writing)
//! - A record and its token rows are written in one transaction
//! - Retry with linear backoff when the database is locked

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};

use super::{IndexStats, RecordStore, DEFAULT_SCAN_CAP};
use crate::error::{Result, SearchError};
use crate::models::PersonRecord;

const MAX_WRITE_RETRIES: u32 = 3;

/// SQLite backed record store / SQLite 记录存储
pub struct SqliteRegistry {
    db: Pool<Sqlite>,
    scan_cap: usize,
}

impl SqliteRegistry {
    /// Open (or create) a registry database file / 打开或创建数据库文件
    pub async fn open(path: impl AsRef<Path>, scan_cap: usize) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db_url = format!("sqlite:{}?mode=rwc", path.to_string_lossy());

        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&db_url)
            .await?;

        // WAL 模式，提高并发性能
        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&db).await?;

        tracing::info!("Registry database opened: {:?} (WAL mode)", path);

        let registry = Self { db, scan_cap };
        registry.init().await?;
        Ok(registry)
    }

    /// Private in-memory database (single connection) / 内存数据库
    pub async fn in_memory() -> Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let registry = Self { db, scan_cap: DEFAULT_SCAN_CAP };
        registry.init().await?;
        Ok(registry)
    }

    pub fn with_scan_cap(mut self, scan_cap: usize) -> Self {
        self.scan_cap = scan_cap;
        self
    }

    /// Close the connection pool / 关闭连接池
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Create tables when missing; existing data is kept / 初始化表结构
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS persons (
                repo TEXT NOT NULL,
                record_id TEXT NOT NULL,
                given_name TEXT,
                family_name TEXT,
                entry_date INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY(repo, record_id)
            ) WITHOUT ROWID
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS person_tokens (
                repo TEXT NOT NULL,
                token TEXT NOT NULL,
                record_id TEXT NOT NULL,
                PRIMARY KEY(repo, token, record_id)
            ) WITHOUT ROWID
            "#,
        )
        .execute(&self.db)
        .await?;

        // 按记录删除 token 时使用
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_person_tokens_record ON person_tokens(repo, record_id)",
        )
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn do_put(&self, record: &PersonRecord) -> Result<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT OR REPLACE INTO persons (repo, record_id, given_name, family_name, entry_date, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.repo)
        .bind(&record.record_id)
        .bind(&record.given_name)
        .bind(&record.family_name)
        .bind(record.entry_date)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM person_tokens WHERE repo = ? AND record_id = ?")
            .bind(&record.repo)
            .bind(&record.record_id)
            .execute(&mut *tx)
            .await?;

        for token in &record.names_tokens {
            sqlx::query("INSERT OR IGNORE INTO person_tokens (repo, token, record_id) VALUES (?, ?, ?)")
                .bind(&record.repo)
                .bind(token)
                .bind(&record.record_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRegistry {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn scan_cap(&self) -> usize {
        self.scan_cap
    }

    async fn lookup_by_token(&self, repo: &str, token: &str) -> Result<Vec<PersonRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT p.repo, p.record_id, p.given_name, p.family_name, p.entry_date,
                (SELECT group_concat(t2.token, char(10)) FROM person_tokens t2
                 WHERE t2.repo = p.repo AND t2.record_id = p.record_id) AS tokens
            FROM person_tokens t
            JOIN persons p ON p.repo = t.repo AND p.record_id = t.record_id
            WHERE t.repo = ? AND t.token = ?
            ORDER BY p.entry_date DESC
            LIMIT ?
            "#,
        )
        .bind(repo)
        .bind(token)
        .bind(self.scan_cap as i64)
        .fetch_all(&self.db)
        .await?;

        let records = rows
            .iter()
            .map(|row| {
                let tokens: Option<String> = row.get("tokens");
                let mut names_tokens: Vec<String> = tokens
                    .unwrap_or_default()
                    .split('\n')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                names_tokens.sort();
                PersonRecord {
                    record_id: row.get("record_id"),
                    repo: row.get("repo"),
                    given_name: row.get("given_name"),
                    family_name: row.get("family_name"),
                    entry_date: row.get("entry_date"),
                    names_tokens,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Lookup {:?} in {}: {} rows", token, repo, records.len());
        Ok(records)
    }

    /// 写入记录 - 带重试机制
    async fn put(&self, record: &PersonRecord) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.do_put(record).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_locked() && attempt + 1 < MAX_WRITE_RETRIES => {
                    attempt += 1;
                    // 数据库锁定，等待后重试
                    let delay = 100 * attempt as u64;
                    tracing::warn!(
                        "Database locked writing {}/{}, retrying in {}ms (attempt {}/{})",
                        record.repo,
                        record.record_id,
                        delay,
                        attempt,
                        MAX_WRITE_RETRIES
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) if e.is_locked() => {
                    return Err(SearchError::Store(format!(
                        "write of {}/{} failed after {} attempts: {}",
                        record.repo, record.record_id, MAX_WRITE_RETRIES, e
                    )))
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn stats(&self, repo: &str) -> Result<IndexStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM persons WHERE repo = ?) AS records,
                (SELECT COUNT(*) FROM person_tokens WHERE repo = ?) AS tokens,
                (SELECT MAX(updated_at) FROM persons WHERE repo = ?) AS last_updated
            "#,
        )
        .bind(repo)
        .bind(repo)
        .bind(repo)
        .fetch_one(&self.db)
        .await?;

        Ok(IndexStats {
            record_count: row.get::<i64, _>("records") as u64,
            token_count: row.get::<i64, _>("tokens") as u64,
            last_updated: row.get::<Option<i64>, _>("last_updated"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Indexer;

    fn indexed(id: &str, repo: &str, given: &str, family: &str) -> PersonRecord {
        let mut record = PersonRecord::new(id, repo, given, family);
        Indexer::default().update_index_properties(&mut record);
        record
    }

    #[tokio::test]
    async fn test_put_and_lookup() {
        let registry = SqliteRegistry::in_memory().await.unwrap();
        let record = indexed("p1", "haiti", "港生", "陳");
        registry.put(&record).await.unwrap();
        registry.put(&indexed("p2", "haiti", "Bryan", "abc")).await.unwrap();

        let hits = registry.lookup_by_token("haiti", "港").await.unwrap();
        assert_eq!(hits, vec![record]);
        assert!(registry.lookup_by_token("chile", "港").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_names_round_trip_as_none() {
        let registry = SqliteRegistry::in_memory().await.unwrap();
        let mut record = indexed("p1", "haiti", "Bryan", "");
        record.family_name = None;
        registry.put(&record).await.unwrap();

        let hits = registry.lookup_by_token("haiti", "bryan").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].family_name, None);
        assert_eq!(hits[0].family_name(), "");
    }

    #[tokio::test]
    async fn test_put_replaces_tokens() {
        let registry = SqliteRegistry::in_memory().await.unwrap();
        registry.put(&indexed("p1", "haiti", "Bryan", "abc")).await.unwrap();
        registry.put(&indexed("p1", "haiti", "Anne", "abc")).await.unwrap();

        assert!(registry.lookup_by_token("haiti", "bryan").await.unwrap().is_empty());
        let stats = registry.stats("haiti").await.unwrap();
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.token_count, 2);
        assert!(stats.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_scan_cap() {
        let registry = SqliteRegistry::in_memory().await.unwrap().with_scan_cap(3);
        for i in 0..6 {
            registry.put(&indexed(&format!("p{}", i), "haiti", "Bryan", "abc")).await.unwrap();
        }
        assert_eq!(registry.lookup_by_token("haiti", "bryan").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry").join("persons.db");
        {
            let registry = SqliteRegistry::open(&path, 10).await.unwrap();
            registry.put(&indexed("p1", "haiti", "Bryan", "abc")).await.unwrap();
            registry.close().await;
        }
        let registry = SqliteRegistry::open(&path, 10).await.unwrap();
        assert_eq!(registry.lookup_by_token("haiti", "abc").await.unwrap().len(), 1);
        registry.close().await;
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let registry = SqliteRegistry::in_memory().await.unwrap();
        assert_eq!(registry.stats("haiti").await.unwrap(), IndexStats::default());
    }
}
