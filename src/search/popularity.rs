//! CJK character popularity table / CJK 字符常用度表
//!
//! Maps a character to a popularity value derived from a name corpus. Higher
//! means more common. Characters that are not in the table count as 0 (least
//! popular). The table is immutable once built and is shared through `Arc`.
//!
//! The built-in table is a compact approximation: a few hundred characters
//! common in CJK personal names, ranked by hand. For a table derived from a
//! real name corpus, point `search.popularity_file` at a TSV file (see
//! [`PopularityTable::parse_tsv`]).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{Result, SearchError};

/// Approximate ranking of characters frequent in CJK personal names, most
/// popular first. Traditional and simplified forms are both listed.
const BUILTIN_RANKING: &str = concat!(
    "王李張张陳陈劉刘楊杨黃黄趙赵吳吴周徐孫孙馬马朱胡郭何林高羅罗鄭郑梁謝谢",
    "宋唐許许韓韩馮冯鄧邓曹彭曾蕭萧田董袁潘于蔣蒋蔡余杜葉叶程蘇苏魏呂吕丁任",
    "沈姚盧卢姜崔鍾钟譚谭陸陆汪范金石廖賈贾夏韋韦付方白鄒邹孟熊秦邱江尹薛閻",
    "阎段雷侯龍龙史陶黎賀贺顧顾毛郝龔龚邵萬万錢钱嚴严覃武戴莫孔向湯汤",
    "藤山野中木川井本村佐島岡崎松原子太郎一二三美平明文英華华國国志建成德東",
    "东春秀花良和正健光口",
);

/// 内置常用度表（进程内只构建一次）
static BUILTIN: Lazy<Arc<PopularityTable>> =
    Lazy::new(|| Arc::new(PopularityTable::from_ranking(BUILTIN_RANKING)));

/// Character popularity table / 字符常用度表
#[derive(Debug, Clone, Default)]
pub struct PopularityTable {
    popularity: HashMap<char, u32>,
}

impl PopularityTable {
    /// The built-in table / 内置表
    pub fn builtin() -> Arc<PopularityTable> {
        BUILTIN.clone()
    }

    /// An empty table; every character has popularity 0 / 空表
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from characters listed most popular first. Repeats keep their first position.
    pub fn from_ranking(ranking: &str) -> Self {
        let ranked: Vec<char> = ranking.chars().filter(|c| !c.is_whitespace()).collect();
        let total = ranked.len() as u32;
        let mut popularity = HashMap::with_capacity(ranked.len());
        for (i, c) in ranked.into_iter().enumerate() {
            popularity.entry(c).or_insert(total - i as u32);
        }
        Self { popularity }
    }

    /// Parse `char<TAB>count` lines; `#` starts a comment / 解析 TSV 表
    pub fn parse_tsv(content: &str) -> Result<Self> {
        let mut popularity = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let mut fields = line.split('\t');
            let (ch, count) = match (fields.next(), fields.next(), fields.next()) {
                (Some(ch), Some(count), None) => (ch.trim(), count.trim()),
                _ => {
                    return Err(SearchError::PopularityTable {
                        line: line_no,
                        reason: "expected `char<TAB>count`".to_string(),
                    })
                }
            };
            let mut it = ch.chars();
            let c = match (it.next(), it.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(SearchError::PopularityTable {
                        line: line_no,
                        reason: format!("`{}` is not a single character", ch),
                    })
                }
            };
            let count: u32 = count.parse().map_err(|e| SearchError::PopularityTable {
                line: line_no,
                reason: format!("bad count `{}`: {}", count, e),
            })?;
            popularity.insert(c, count);
        }
        Ok(Self { popularity })
    }

    /// Load a TSV table from disk / 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse_tsv(&content)?;
        tracing::info!("Loaded popularity table from {:?} ({} characters)", path, table.len());
        Ok(table)
    }

    /// Popularity of one character, 0 when absent
    pub fn get(&self, c: char) -> u32 {
        self.popularity.get(&c).copied().unwrap_or(0)
    }

    /// Popularity of a token: only single-character tokens can be in the table.
    pub fn token_popularity(&self, token: &str) -> u32 {
        let mut it = token.chars();
        match (it.next(), it.next()) {
            (Some(c), None) => self.get(c),
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.popularity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popularity.is_empty()
    }
}
