//! Candidate ranking / 候选排序
//!
//! Every candidate gets a [`MatchTier`] from ordered predicate checks, best
//! tier first. The sort is stable and never drops a candidate; `limit` only
//! truncates the ordered list.
//!
//! Name order convention: CJK names are written family name first, other
//! names given name first. "Forward" means the convention of the candidate's
//! own name, decided by whether its family name contains CJK.

use std::cmp::Reverse;
use std::collections::HashMap;

use super::query::TextQuery;
use super::tokenizer::{self, contains_cjk, is_cjk_unit, ScriptMode};
use crate::models::PersonRecord;

/// Match quality of a candidate, higher is better / 匹配等级（越大越好）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    /// Nothing in common with the query / 不匹配
    NoMatch,
    /// Some query units present, exactly or as a prefix / 部分匹配
    Partial,
    /// Given name alone equals the query / 仅名字完全匹配
    GivenNameExact,
    /// All units present once each, in another order / 乱序完全匹配
    Reordered,
    /// Name parts in the opposite of the conventional order / 姓名顺序颠倒的完全匹配
    ReverseExact,
    /// Name parts in the conventional order / 按惯例顺序的完全匹配
    ForwardExact,
}

/// Full sort key of a candidate; smaller sorts first / 排序键（小的在前）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore {
    tier: Reverse<MatchTier>,
    /// Characters in the leading name part (character mode exact tiers) / 首位姓名部分的字数
    lead_len: usize,
    exact_hits: Reverse<usize>,
    prefix_hits: Reverse<usize>,
    full_name: String,
}

impl MatchScore {
    pub fn tier(&self) -> MatchTier {
        self.tier.0
    }
}

/// Tokenized view of a candidate's name / 候选姓名的分词视图
struct NameView {
    given: String,
    family: String,
    family_first: bool,
}

impl NameView {
    fn new(record: &PersonRecord) -> Self {
        let family = record.family_name().to_string();
        Self {
            given: record.given_name().to_string(),
            family_first: contains_cjk(&family),
            family,
        }
    }

    /// (leading, trailing) parts in the conventional order
    fn conventional(&self) -> (&str, &str) {
        if self.family_first {
            (&self.family, &self.given)
        } else {
            (&self.given, &self.family)
        }
    }

    fn sequence(text: &str, mode: ScriptMode) -> Vec<String> {
        match mode {
            ScriptMode::Word => tokenizer::words(text),
            ScriptMode::Character => tokenizer::chars(text),
        }
    }

    /// Whether `first` then `second` spells the query tokens exactly
    fn spells(first: &str, second: &str, query: &TextQuery) -> bool {
        let mut seq = Self::sequence(first, query.mode);
        seq.extend(Self::sequence(second, query.mode));
        seq == query.tokens
    }

    fn lead_len(part: &str, mode: ScriptMode) -> usize {
        match mode {
            ScriptMode::Character => tokenizer::chars(part).len(),
            ScriptMode::Word => 0,
        }
    }
}

/// Score one candidate against a query / 计算单个候选的排序键
pub fn score(record: &PersonRecord, query: &TextQuery) -> MatchScore {
    let mut score = MatchScore {
        tier: Reverse(MatchTier::NoMatch),
        lead_len: 0,
        exact_hits: Reverse(0),
        prefix_hits: Reverse(0),
        full_name: String::new(),
    };
    // 空查询：所有候选同分，保持原有顺序
    if query.is_empty() {
        return score;
    }
    score.full_name = record.full_name().to_lowercase();

    let view = NameView::new(record);

    let (leading, trailing) = view.conventional();
    if NameView::spells(leading, trailing, query) {
        score.tier = Reverse(MatchTier::ForwardExact);
        score.lead_len = NameView::lead_len(leading, query.mode);
        return score;
    }
    if NameView::spells(trailing, leading, query) {
        score.tier = Reverse(MatchTier::ReverseExact);
        score.lead_len = NameView::lead_len(trailing, query.mode);
        return score;
    }

    let given_units = tokenizer::units(&view.given);
    let mut name_units = given_units.clone();
    name_units.extend(tokenizer::units(&view.family));

    if same_multiset(&name_units, &query.units) {
        score.tier = Reverse(MatchTier::Reordered);
        return score;
    }
    if given_units == query.units {
        score.tier = Reverse(MatchTier::GivenNameExact);
        return score;
    }

    let (exact, prefix) = containment(&name_units, &query.units, query.mode);
    if exact + prefix > 0 {
        score.tier = Reverse(MatchTier::Partial);
        score.exact_hits = Reverse(exact);
        score.prefix_hits = Reverse(prefix);
    }
    score
}

fn same_multiset(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for unit in a {
        *counts.entry(unit.as_str()).or_default() += 1;
    }
    for unit in b {
        *counts.entry(unit.as_str()).or_default() -= 1;
    }
    counts.values().all(|&n| n == 0)
}

/// Count query units found exactly, and as a prefix of a name unit.
/// Prefix credit is for non-CJK units of word-mode queries only.
fn containment(name_units: &[String], query_units: &[String], mode: ScriptMode) -> (usize, usize) {
    let mut exact = 0;
    let mut prefix = 0;
    for unit in query_units {
        if name_units.iter().any(|u| u == unit) {
            exact += 1;
        } else if mode == ScriptMode::Word
            && !is_cjk_unit(unit)
            && name_units.iter().any(|u| u.starts_with(unit.as_str()))
        {
            prefix += 1;
        }
    }
    (exact, prefix)
}

/// Rank candidates best first and keep at most `limit` / 排序并截断
pub fn rank(candidates: Vec<PersonRecord>, query: &TextQuery, limit: usize) -> Vec<PersonRecord> {
    let mut scored: Vec<(MatchScore, PersonRecord)> = candidates
        .into_iter()
        .map(|record| (score(&record, query), record))
        .collect();
    // sort_by 是稳定排序，同分保持原有顺序
    scored.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some((best, record)) = scored.first() {
        tracing::debug!(
            "Ranked {} candidates for {:?}, best {:?} ({})",
            scored.len(),
            query.raw,
            best.tier(),
            record.record_id
        );
    }

    scored.into_iter().take(limit).map(|(_, record)| record).collect()
}
