//! Query parser / 查询解析

use serde::{Deserialize, Serialize};

use super::tokenizer::{self, ScriptMode};

/// A parsed free-text name query / 解析后的姓名查询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextQuery {
    /// Raw query text as typed / 原始查询
    pub raw: String,
    /// Resolved script mode / 分词模式
    pub mode: ScriptMode,
    /// Token sequence in typed order / 按输入顺序的 token
    pub tokens: Vec<String>,
    /// Words with CJK characters split out, used by ranking / 姓名单元（排序用）
    pub units: Vec<String>,
}

impl TextQuery {
    /// Parse raw query text. Never fails; blank text yields no tokens. / 解析查询，空白输入得到空 token
    pub fn parse(raw: &str) -> Self {
        let (mode, tokens) = tokenizer::tokenize(raw);
        Self {
            raw: raw.to_string(),
            mode,
            tokens,
            units: tokenizer::units(raw),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_mode() {
        let q = TextQuery::parse("Bryan  ABC");
        assert_eq!(q.mode, ScriptMode::Word);
        assert_eq!(q.tokens, vec!["bryan", "abc"]);
        assert_eq!(q.units, vec!["bryan", "abc"]);
    }

    #[test]
    fn test_parse_single_word() {
        let q = TextQuery::parse("Bryan");
        assert_eq!(q.mode, ScriptMode::Word);
        assert_eq!(q.tokens, vec!["bryan"]);
    }

    #[test]
    fn test_parse_character_mode() {
        let q = TextQuery::parse("朱棣文");
        assert_eq!(q.mode, ScriptMode::Character);
        assert_eq!(q.tokens, vec!["朱", "棣", "文"]);
        assert_eq!(q.units, q.tokens);
    }

    #[test]
    fn test_parse_spaced_cjk() {
        let q = TextQuery::parse("朱 棣文");
        assert_eq!(q.mode, ScriptMode::Word);
        assert_eq!(q.tokens, vec!["朱", "棣文"]);
        assert_eq!(q.units, vec!["朱", "棣", "文"]);
    }

    #[test]
    fn test_parse_blank() {
        for raw in ["", "   ", "\t\n"] {
            let q = TextQuery::parse(raw);
            assert!(q.is_empty());
            assert!(q.units.is_empty());
        }
    }

    #[test]
    fn test_parse_is_pure() {
        assert_eq!(TextQuery::parse("陳 港生"), TextQuery::parse("陳 港生"));
    }
}
