//! Query word ordering / 查询词排序
//!
//! The store only answers equality lookups, so the retriever issues its
//! lookup on the most discriminating word. Sort keys, in precedence:
//! 1. length, longest first
//! 2. popularity, least popular first (absent characters count as 0)
//! 3. lexicographic, ascending

use std::cmp::Reverse;
use std::sync::Arc;

use super::popularity::PopularityTable;

/// Orders query words for lookup / 查询词排序器
#[derive(Debug, Clone)]
pub struct QueryWordOrderer {
    popularity: Arc<PopularityTable>,
}

impl QueryWordOrderer {
    pub fn new(popularity: Arc<PopularityTable>) -> Self {
        Self { popularity }
    }

    /// Return the words sorted most discriminating first. Input is not modified.
    pub fn order(&self, words: &[String]) -> Vec<String> {
        sort_query_words(words, &self.popularity)
    }
}

impl Default for QueryWordOrderer {
    fn default() -> Self {
        Self::new(PopularityTable::builtin())
    }
}

/// Sort query words by length, popularity, then lexicographically / 按长度、常用度、字典序排序
pub fn sort_query_words(words: &[String], popularity: &PopularityTable) -> Vec<String> {
    let mut sorted = words.to_vec();
    sorted.sort_by(|a, b| {
        let ka = (Reverse(a.chars().count()), popularity.token_popularity(a));
        let kb = (Reverse(b.chars().count()), popularity.token_popularity(b));
        ka.cmp(&kb).then_with(|| a.cmp(b))
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_sorted_lexicographically() {
        let orderer = QueryWordOrderer::default();
        assert_eq!(orderer.order(&strings(&["CC", "BB", "AA"])), strings(&["AA", "BB", "CC"]));
    }

    #[test]
    fn test_sorted_by_length() {
        let orderer = QueryWordOrderer::default();
        assert_eq!(orderer.order(&strings(&["A", "AA", "AAA"])), strings(&["AAA", "AA", "A"]));
    }

    #[test]
    fn test_sorted_by_popularity() {
        let orderer = QueryWordOrderer::default();
        assert_eq!(orderer.order(&strings(&["川", "口", "良"])), strings(&["口", "良", "川"]));
    }

    #[test]
    fn test_sort_key_precedence() {
        let orderer = QueryWordOrderer::default();
        assert_eq!(
            orderer.order(&strings(&["CCC", "BB", "AA", "A"])),
            strings(&["CCC", "AA", "BB", "A"])
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "港生" 占6字节，但只有2个字符
        let orderer = QueryWordOrderer::new(Arc::new(PopularityTable::empty()));
        assert_eq!(orderer.order(&strings(&["港生", "abc"])), strings(&["abc", "港生"]));
    }

    #[test]
    fn test_unknown_characters_sort_before_known() {
        let orderer = QueryWordOrderer::default();
        assert_eq!(orderer.order(&strings(&["平", "嘉"])), strings(&["嘉", "平"]));
    }

    #[test]
    fn test_empty() {
        let orderer = QueryWordOrderer::default();
        assert!(orderer.order(&[]).is_empty());
    }
}
