//! In-memory record store / 内存记录存储
//!
//! An inverted index from `(repo, token)` to record keys. Suits tests and
//! small deployments; everything is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use super::{IndexStats, RecordStore, DEFAULT_SCAN_CAP};
use crate::error::Result;
use crate::models::PersonRecord;

/// (repo, record_id)
type RecordKey = (String, String);

/// In-memory store / 内存存储
pub struct MemoryStore {
    /// Record storage: key -> record / 记录存储
    records: RwLock<HashMap<RecordKey, PersonRecord>>,
    /// Inverted index: (repo, token) -> [record_id] / 倒排索引
    postings: RwLock<HashMap<(String, String), Vec<String>>>,
    /// Last write per repo / 最后更新时间
    last_updated: Mutex<HashMap<String, i64>>,
    scan_cap: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_scan_cap(DEFAULT_SCAN_CAP)
    }

    pub fn with_scan_cap(scan_cap: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            postings: RwLock::new(HashMap::new()),
            last_updated: Mutex::new(HashMap::new()),
            scan_cap,
        }
    }

    /// Number of stored records across all repos / 记录总数
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Fetch one record / 获取单条记录
    pub fn get(&self, repo: &str, record_id: &str) -> Option<PersonRecord> {
        self.records
            .read()
            .get(&(repo.to_string(), record_id.to_string()))
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn scan_cap(&self) -> usize {
        self.scan_cap
    }

    async fn lookup_by_token(&self, repo: &str, token: &str) -> Result<Vec<PersonRecord>> {
        let ids = {
            let postings = self.postings.read();
            match postings.get(&(repo.to_string(), token.to_string())) {
                Some(ids) => ids.clone(),
                None => return Ok(Vec::new()),
            }
        };

        let records = self.records.read();
        Ok(ids
            .iter()
            .filter_map(|id| records.get(&(repo.to_string(), id.clone())).cloned())
            .take(self.scan_cap)
            .collect())
    }

    async fn put(&self, record: &PersonRecord) -> Result<()> {
        let key = (record.repo.clone(), record.record_id.clone());

        // 同一条记录的写入在这两把锁内完成
        let mut records = self.records.write();
        let mut postings = self.postings.write();

        // 先删除旧 token
        if let Some(old) = records.get(&key) {
            for token in &old.names_tokens {
                let posting_key = (old.repo.clone(), token.clone());
                if let Some(ids) = postings.get_mut(&posting_key) {
                    ids.retain(|id| id != &old.record_id);
                    if ids.is_empty() {
                        postings.remove(&posting_key);
                    }
                }
            }
        }

        for token in &record.names_tokens {
            postings
                .entry((record.repo.clone(), token.clone()))
                .or_default()
                .push(record.record_id.clone());
        }
        records.insert(key, record.clone());

        self.last_updated
            .lock()
            .insert(record.repo.clone(), chrono::Utc::now().timestamp());
        Ok(())
    }

    async fn stats(&self, repo: &str) -> Result<IndexStats> {
        let records = self.records.read();
        let (record_count, token_count) = records
            .values()
            .filter(|r| r.repo == repo)
            .fold((0u64, 0u64), |(n, t), r| (n + 1, t + r.names_tokens.len() as u64));
        Ok(IndexStats {
            record_count,
            token_count,
            last_updated: self.last_updated.lock().get(repo).copied(),
        })
    }
}
