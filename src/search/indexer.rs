//! Name indexer / 姓名索引
//!
//! Derives the token set stored with each record. The store can only do
//! equality lookups, so the set holds:
//! - the field's tokens under the query parser's rule, so a name typed as
//!   stored always has its lookup word in the set
//! - every whitespace word of each name field (a CJK run without spaces is one word)
//! - every CJK character on its own, so one typed character finds the names containing it
//! - optionally, prefixes of non-CJK words (capped)

use std::collections::BTreeSet;

use super::tokenizer::{self, contains_cjk, is_cjk};
use crate::models::PersonRecord;

/// Default cap on added prefix tokens / 前缀 token 默认上限
pub const DEFAULT_MAX_PREFIX_TOKENS: usize = 100;

/// Index the two name fields / 为姓名字段生成检索 token
pub fn index_name(given_name: &str, family_name: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    for field in [given_name, family_name] {
        add_field_tokens(&mut tokens, field);
    }
    tokens
}

fn add_field_tokens(tokens: &mut BTreeSet<String>, field: &str) {
    // 与查询解析同一规则：无空格且含CJK的字段逐字切分
    let (_, parsed) = tokenizer::tokenize(field);
    tokens.extend(parsed);
    for word in tokenizer::words(field) {
        for c in word.chars().filter(|c| is_cjk(*c)) {
            tokens.insert(c.to_string());
        }
        tokens.insert(word);
    }
}

/// Indexer with prefix options / 带前缀选项的索引器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indexer {
    /// Also store prefixes of non-CJK words / 是否索引前缀
    pub prefixes: bool,
    /// Cap on the number of added prefix tokens / 前缀 token 上限
    pub max_prefix_tokens: usize,
}

impl Default for Indexer {
    fn default() -> Self {
        Self {
            prefixes: false,
            max_prefix_tokens: DEFAULT_MAX_PREFIX_TOKENS,
        }
    }
}

impl Indexer {
    /// Token set for a pair of name fields / 计算 token 集合
    pub fn tokens(&self, given_name: &str, family_name: &str) -> BTreeSet<String> {
        let mut tokens = index_name(given_name, family_name);
        if !self.prefixes {
            return tokens;
        }

        // 只为非CJK单词加前缀，短前缀优先
        let mut prefixes: BTreeSet<(usize, String)> = BTreeSet::new();
        for word in tokens.iter().filter(|t| !contains_cjk(t)) {
            let mut prefix = String::new();
            for c in word.chars() {
                prefix.push(c);
                if !tokens.contains(&prefix) {
                    prefixes.insert((prefix.chars().count(), prefix.clone()));
                }
            }
        }

        if prefixes.len() > self.max_prefix_tokens {
            tracing::warn!(
                "Prefix tokens capped at {} (had {}) for {:?} {:?}",
                self.max_prefix_tokens,
                prefixes.len(),
                given_name,
                family_name
            );
        }
        tokens.extend(
            prefixes
                .into_iter()
                .take(self.max_prefix_tokens)
                .map(|(_, prefix)| prefix),
        );
        tokens
    }

    /// Recompute the stored tokens of a record in place / 更新记录的检索 token
    pub fn update_index_properties(&self, record: &mut PersonRecord) {
        record.names_tokens = self
            .tokens(record.given_name(), record.family_name())
            .into_iter()
            .collect();
    }
}
