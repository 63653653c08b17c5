use serde::{Deserialize, Serialize};

/// A person entry in a registry repository / 登记库中的人员记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub record_id: String,
    /// Repository (search scope) the record belongs to / 所属登记库
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    /// Unix timestamp of the entry / 录入时间
    #[serde(default)]
    pub entry_date: i64,
    /// Derived lookup tokens, sorted and unique. Rebuilt by reindexing. / 检索 token（由索引生成）
    #[serde(default)]
    pub names_tokens: Vec<String>,
}

impl PersonRecord {
    pub fn new(
        record_id: impl Into<String>,
        repo: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            repo: repo.into(),
            given_name: Some(given_name.into()),
            family_name: Some(family_name.into()),
            entry_date: chrono::Utc::now().timestamp(),
            names_tokens: Vec::new(),
        }
    }

    /// Given name, empty when missing
    pub fn given_name(&self) -> &str {
        self.given_name.as_deref().unwrap_or("")
    }

    /// Family name, empty when missing
    pub fn family_name(&self) -> &str {
        self.family_name.as_deref().unwrap_or("")
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name(), self.family_name())
    }

    /// Whether the stored token set contains `token` / 是否包含 token
    pub fn has_token(&self, token: &str) -> bool {
        self.names_tokens
            .binary_search_by(|t| t.as_str().cmp(token))
            .is_ok()
    }
}
