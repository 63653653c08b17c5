pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod storage;

pub use error::{Result, SearchError};
pub use models::PersonRecord;
pub use search::{SearchEngine, SearchSettings, TextQuery};
pub use storage::{MemoryStore, RecordStore, SqliteRegistry};
