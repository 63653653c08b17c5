//! Search module - name indexing and ranking primitives / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search module only exposes primitive operations: reindex, search
//! - Storage adapters own persistence; the search core never touches SQL
//! - Call direction: Core → Storage (unidirectional) / 调用方向
//!
//! Index features / 索引特性：
//! - Whitespace words for Latin-script names, single characters for CJK names
//! - Most discriminating query word drives a single equality lookup
//! - Candidates are re-ranked by how closely the name fields match the query

pub mod engine;
pub mod indexer;
pub mod order;
pub mod popularity;
pub mod query;
pub mod ranker;
pub mod retriever;
pub mod tokenizer;

pub use engine::{SearchEngine, SearchSettings};
pub use indexer::{index_name, Indexer};
pub use order::{sort_query_words, QueryWordOrderer};
pub use popularity::PopularityTable;
pub use query::TextQuery;
pub use ranker::{rank, MatchTier};
pub use retriever::{CandidateRetriever, RetrievalMode};
pub use tokenizer::ScriptMode;
