//! Name tokenizer / 姓名分词器
//!
//! Supports / 支持：
//! - Latin names: whitespace separated words, lowercased / 拉丁文姓名按空白分词并转小写
//! - CJK names: no word boundaries, every character is a token / 中日韩姓名逐字切分
//! - Mixed text: each whitespace chunk is one word / 混合文本按空白切分
//!
//! There is a single tokenizer that branches on [`is_cjk`]; script handling
//! is a per-character decision, not a type per language.

use serde::{Deserialize, Serialize};

/// How a piece of text is split into tokens / 分词模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptMode {
    /// Whitespace delimited words / 按空白分词
    Word,
    /// One token per code point / 逐字分词
    Character,
}

/// Check if a character is CJK (Chinese, Japanese, Korean) / 检测字符是否为CJK字符
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}' |    // CJK Unified Ideographs
        '\u{3400}'..='\u{4dbf}' |    // CJK Extension A
        '\u{20000}'..='\u{2ebef}' |  // CJK Extension B-F
        '\u{f900}'..='\u{faff}' |    // CJK Compatibility Ideographs
        '\u{3040}'..='\u{309f}' |    // Hiragana
        '\u{30a0}'..='\u{30ff}' |    // Katakana
        '\u{ac00}'..='\u{d7af}'      // Hangul Syllables
    )
}

/// Check if text contains CJK characters / 检测文本是否包含CJK字符
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Decide the script mode of a trimmed string / 判断分词模式
pub fn script_mode(text: &str) -> ScriptMode {
    let text = text.trim();
    if !text.chars().any(char::is_whitespace) && contains_cjk(text) {
        ScriptMode::Character
    } else {
        ScriptMode::Word
    }
}

/// Whitespace separated, lowercased words / 按空白切分并转小写
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Every non-whitespace code point, lowercased / 逐字切分（忽略空白）
pub fn chars(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(String::from)
        .collect()
}

/// Tokenize text with its own script mode / 按文本自身的分词模式切分
///
/// Word mode gives [`words`], character mode gives [`chars`]. Empty or
/// whitespace-only text gives no tokens.
pub fn tokenize(text: &str) -> (ScriptMode, Vec<String>) {
    let mode = script_mode(text);
    let tokens = match mode {
        ScriptMode::Word => words(text),
        ScriptMode::Character => chars(text),
    };
    (mode, tokens)
}

/// Split text into name units / 切分为姓名单元
///
/// Words with every CJK character split out on its own, so `"Bryan陳"`
/// becomes `["bryan", "陳"]` and `"港生"` becomes `["港", "生"]`.
pub fn units(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    for word in text.split_whitespace() {
        let mut run = String::new();
        for c in word.chars() {
            if is_cjk(c) {
                if !run.is_empty() {
                    units.push(std::mem::take(&mut run).to_lowercase());
                }
                units.push(c.to_lowercase().collect());
            } else {
                run.push(c);
            }
        }
        if !run.is_empty() {
            units.push(run.to_lowercase());
        }
    }
    units
}

/// Whether a unit is a single CJK character / 是否为单个CJK字符
pub fn is_cjk_unit(unit: &str) -> bool {
    let mut it = unit.chars();
    matches!((it.next(), it.next()), (Some(c), None) if is_cjk(c))
}
