//! Candidate retrieval / 候选召回
//!
//! One equality lookup on the most discriminating query word. Records that
//! only share a later word are not retrieved; that keeps the cost of a search
//! bounded by the store's scan cap.

use serde::{Deserialize, Serialize};

use super::order::QueryWordOrderer;
use super::query::TextQuery;
use crate::error::Result;
use crate::models::PersonRecord;
use crate::storage::RecordStore;

/// How looked-up candidates are filtered / 召回模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Every record sharing the primary word / 只按首个查询词召回
    #[default]
    PrimaryToken,
    /// Only records whose token set holds every query word / 必须包含全部查询词
    AllTokens,
}

/// Candidate retriever / 候选召回器
#[derive(Debug, Clone)]
pub struct CandidateRetriever {
    orderer: QueryWordOrderer,
    mode: RetrievalMode,
}

impl CandidateRetriever {
    pub fn new(orderer: QueryWordOrderer, mode: RetrievalMode) -> Self {
        Self { orderer, mode }
    }

    /// Fetch candidates for a query from `repo`. At most the store's scan cap
    /// is returned, in no particular order; `limit` is applied by ranking.
    pub async fn retrieve(
        &self,
        store: &dyn RecordStore,
        repo: &str,
        query: &TextQuery,
        limit: usize,
    ) -> Result<Vec<PersonRecord>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let words = self.orderer.order(&query.tokens);
        let primary = &words[0];
        tracing::debug!(
            "Query words {:?}, lookup {:?} in {} (store {}, limit {})",
            words,
            primary,
            repo,
            store.name(),
            limit
        );

        let mut candidates = store.lookup_by_token(repo, primary).await?;
        let looked_up = candidates.len();
        if self.mode == RetrievalMode::AllTokens {
            candidates.retain(|record| words[1..].iter().all(|w| record.has_token(w)));
        }

        let scan_cap = store.scan_cap();
        if looked_up >= scan_cap {
            tracing::warn!(
                "Lookup {:?} in {} hit the scan cap ({}); some matching records may be missing",
                primary,
                repo,
                scan_cap
            );
        }
        tracing::debug!("Retrieved {} candidates from {}", candidates.len(), repo);
        Ok(candidates)
    }
}

impl Default for CandidateRetriever {
    fn default() -> Self {
        Self::new(QueryWordOrderer::default(), RetrievalMode::default())
    }
}
