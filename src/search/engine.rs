//! Search engine - composes the name search primitives / 搜索引擎
//!
//! Architecture principle: only expose primitive operations, do not control flow / 架构原则
//! - search: parse → order → retrieve → rank / 搜索
//! - reindex: derive tokens → store put / 重建索引
//! - reindex_all: batch reindex / 批量重建
//!
//! The engine holds no mutable state; it can be shared behind `Arc` and
//! called from any number of tasks at once.

use std::sync::Arc;

use super::indexer::Indexer;
use super::order::QueryWordOrderer;
use super::popularity::PopularityTable;
use super::query::TextQuery;
use super::ranker;
use super::retriever::{CandidateRetriever, RetrievalMode};
use crate::error::Result;
use crate::models::PersonRecord;
use crate::storage::RecordStore;

/// Engine settings / 引擎设置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub retrieval: RetrievalMode,
    pub indexer: Indexer,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            retrieval: RetrievalMode::PrimaryToken,
            indexer: Indexer::default(),
        }
    }
}

/// Name search engine / 姓名搜索引擎
pub struct SearchEngine {
    store: Arc<dyn RecordStore>,
    retriever: CandidateRetriever,
    indexer: Indexer,
}

impl SearchEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        settings: SearchSettings,
        popularity: Arc<PopularityTable>,
    ) -> Self {
        Self {
            store,
            retriever: CandidateRetriever::new(QueryWordOrderer::new(popularity), settings.retrieval),
            indexer: settings.indexer,
        }
    }

    /// Engine with default settings and the built-in popularity table
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self::new(store, SearchSettings::default(), PopularityTable::builtin())
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Search `repo` for a raw name query, best matches first / 搜索
    pub async fn search(&self, repo: &str, raw_query: &str, limit: usize) -> Result<Vec<PersonRecord>> {
        let query = TextQuery::parse(raw_query);
        if query.is_empty() {
            tracing::debug!("Empty query for {}, nothing to search", repo);
            return Ok(Vec::new());
        }

        let candidates = self
            .retriever
            .retrieve(self.store.as_ref(), repo, &query, limit)
            .await?;
        Ok(ranker::rank(candidates, &query, limit))
    }

    /// Recompute the record's tokens and persist it / 重建单条记录索引并写入
    pub async fn reindex(&self, mut record: PersonRecord) -> Result<PersonRecord> {
        self.indexer.update_index_properties(&mut record);
        if record.names_tokens.is_empty() {
            tracing::debug!(
                "Record {}/{} has no name tokens; it cannot be found by search",
                record.repo,
                record.record_id
            );
        }
        self.store.put(&record).await?;
        Ok(record)
    }

    /// Reindex records in order, stopping at the first failure / 批量重建索引
    pub async fn reindex_all(&self, records: Vec<PersonRecord>) -> Result<usize> {
        let total = records.len();
        let mut indexed = 0;
        for record in records {
            self.reindex(record).await?;
            indexed += 1;
        }
        tracing::info!("Reindexed {}/{} records into {}", indexed, total, self.store.name());
        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn engine() -> SearchEngine {
        SearchEngine::with_store(Arc::new(MemoryStore::new()))
    }

    fn person(given: &str, family: &str) -> PersonRecord {
        PersonRecord::new(format!("{}/{}", given, family), "test", given, family)
    }

    async fn add_persons(engine: &SearchEngine, names: &[(&str, &str)]) {
        for (given, family) in names {
            engine.reindex(person(given, family)).await.unwrap();
        }
    }

    async fn get_matches(engine: &SearchEngine, query: &str) -> Vec<(String, String)> {
        engine
            .search("test", query, 100)
            .await
            .unwrap()
            .iter()
            .map(|p| (p.given_name().to_string(), p.family_name().to_string()))
            .collect()
    }

    fn pair(given: &str, family: &str) -> (String, String) {
        (given.to_string(), family.to_string())
    }

    #[tokio::test]
    async fn test_search() {
        let engine = engine();
        add_persons(
            &engine,
            &[
                ("Bryan", "abc"),
                ("Bryan", "abcef"),
                ("abc", "Bryan"),
                ("Bryan abc", "efg"),
                ("AAAA BBBB", "CCC DDD"),
            ],
        )
        .await;

        let res = engine.search("test", "Bryan abc", 1).await.unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!((res[0].given_name(), res[0].family_name()), ("Bryan", "abc"));

        assert_eq!(get_matches(&engine, "CC AAAA").await, vec![pair("AAAA BBBB", "CCC DDD")]);
    }

    #[tokio::test]
    async fn test_cjk_given_name_only() {
        let engine = engine();
        add_persons(&engine, &[("余嘉平", "foo"), ("胡涛平", "foo")]).await;

        // 任意单字都能命中
        assert_eq!(get_matches(&engine, "余").await, vec![pair("余嘉平", "foo")]);
        assert_eq!(get_matches(&engine, "嘉").await, vec![pair("余嘉平", "foo")]);
        assert_eq!(
            get_matches(&engine, "平").await,
            vec![pair("余嘉平", "foo"), pair("胡涛平", "foo")]
        );

        // 查询字的顺序无关
        assert_eq!(get_matches(&engine, "嘉平").await, vec![pair("余嘉平", "foo")]);
        assert_eq!(get_matches(&engine, "平嘉").await, vec![pair("余嘉平", "foo")]);
        assert_eq!(get_matches(&engine, "余嘉平").await, vec![pair("余嘉平", "foo")]);
    }

    #[tokio::test]
    async fn test_cjk_family_name_only() {
        let engine = engine();
        add_persons(&engine, &[("foo", "余嘉平"), ("foo", "胡涛平")]).await;

        assert_eq!(get_matches(&engine, "余").await, vec![pair("foo", "余嘉平")]);
        assert_eq!(get_matches(&engine, "嘉").await, vec![pair("foo", "余嘉平")]);
        assert_eq!(
            get_matches(&engine, "平").await,
            vec![pair("foo", "余嘉平"), pair("foo", "胡涛平")]
        );
        assert_eq!(get_matches(&engine, "嘉平").await, vec![pair("foo", "余嘉平")]);
        assert_eq!(get_matches(&engine, "平嘉").await, vec![pair("foo", "余嘉平")]);
        assert_eq!(get_matches(&engine, "余嘉平").await, vec![pair("foo", "余嘉平")]);
    }

    #[tokio::test]
    async fn test_cjk_given_and_family_name() {
        let engine = engine();
        add_persons(&engine, &[("嘉平", "余"), ("涛平", "胡")]).await;

        assert_eq!(get_matches(&engine, "余").await, vec![pair("嘉平", "余")]);
        assert_eq!(get_matches(&engine, "嘉").await, vec![pair("嘉平", "余")]);
        assert_eq!(
            get_matches(&engine, "平").await,
            vec![pair("嘉平", "余"), pair("涛平", "胡")]
        );
        assert_eq!(get_matches(&engine, "嘉平").await, vec![pair("嘉平", "余")]);
        assert_eq!(get_matches(&engine, "平嘉").await, vec![pair("嘉平", "余")]);
        assert_eq!(get_matches(&engine, "余嘉平").await, vec![pair("嘉平", "余")]);
    }

    #[tokio::test]
    async fn test_mixed_script_name_found_as_stored() {
        let engine = engine();
        add_persons(&engine, &[("Mary陳", "Lee"), ("Mary", "Lee")]).await;

        assert_eq!(get_matches(&engine, "Mary陳").await, vec![pair("Mary陳", "Lee")]);
        assert_eq!(get_matches(&engine, "Mary陳 Lee").await, vec![pair("Mary陳", "Lee")]);
    }

    #[tokio::test]
    async fn test_no_query_terms() {
        let engine = engine();
        add_persons(&engine, &[("Bryan", "abc"), ("", "")]).await;
        assert!(engine.search("test", "", 100).await.unwrap().is_empty());
        assert!(engine.search("test", "   ", 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_repo() {
        let engine = engine();
        engine.reindex(PersonRecord::new("1", "haiti", "Bryan", "abc")).await.unwrap();
        engine.reindex(PersonRecord::new("2", "chile", "Bryan", "abc")).await.unwrap();
        let res = engine.search("chile", "bryan", 10).await.unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].record_id, "2");
    }

    #[tokio::test]
    async fn test_reindex_after_name_edit() {
        let engine = engine();
        let record = engine.reindex(PersonRecord::new("1", "test", "Bryan", "abc")).await.unwrap();
        assert_eq!(record.names_tokens, vec!["abc", "bryan"]);

        let mut edited = record.clone();
        edited.given_name = Some("Brian".to_string());
        engine.reindex(edited).await.unwrap();

        assert!(engine.search("test", "bryan", 10).await.unwrap().is_empty());
        assert_eq!(engine.search("test", "brian", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prefix_index_with_all_tokens() {
        let settings = SearchSettings {
            retrieval: RetrievalMode::AllTokens,
            indexer: Indexer { prefixes: true, ..Default::default() },
        };
        let engine = SearchEngine::new(Arc::new(MemoryStore::new()), settings, PopularityTable::builtin());
        add_persons(&engine, &[("AAAA BBBB", "CCC DDD"), ("AAAA", "EEE")]).await;

        assert_eq!(get_matches(&engine, "CC AAAA").await, vec![pair("AAAA BBBB", "CCC DDD")]);
        assert_eq!(get_matches(&engine, "aa").await.len(), 2);
    }

    #[tokio::test]
    async fn test_reindex_all() {
        let engine = engine();
        let count = engine
            .reindex_all(vec![person("Bryan", "abc"), person("abc", "Bryan")])
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(engine.store().stats("test").await.unwrap().record_count, 2);
    }

    #[tokio::test]
    async fn test_concurrent_searches() {
        let engine = Arc::new(engine());
        add_persons(&engine, &[("Bryan", "abc"), ("abc", "Bryan")]).await;

        let handles: Vec<_> = ["Bryan abc", "abc Bryan"]
            .into_iter()
            .map(|q| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.search("test", q, 10).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().len(), 2);
        }
    }
}
