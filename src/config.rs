//! Application configuration module / 应用配置模块
//!
//! Manages application configuration loaded from config.json
//! Creates default config file on first run / 首次运行时创建默认配置文件

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SearchError};
use crate::search::{Indexer, RetrievalMode, SearchSettings};
use crate::storage::DEFAULT_SCAN_CAP;

/// Global configuration instance / 全局配置实例
static CONFIG: OnceCell<Arc<RwLock<AppConfig>>> = OnceCell::new();

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration / 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search configuration / 搜索配置
    #[serde(default)]
    pub search: SearchConfig,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path / 数据目录路径
    pub data_dir: String,
    /// Registry database file path (relative to data_dir) / 登记库文件路径
    pub db_file: String,
}

/// Search configuration / 搜索配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rows a single token lookup may return / 单次查询扫描上限
    pub scan_cap: usize,
    /// Result limit when none is given / 默认返回条数
    pub default_limit: usize,
    /// Candidate retrieval mode / 召回模式
    pub retrieval: RetrievalMode,
    /// Index prefixes of Latin-script words / 是否索引前缀
    pub index_prefixes: bool,
    /// Cap on prefix tokens per record / 前缀 token 上限
    pub max_prefix_tokens: usize,
    /// Optional TSV popularity table; the built-in table is used when unset / 常用度表文件
    pub popularity_file: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_file: "registry.db".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scan_cap: DEFAULT_SCAN_CAP,
            default_limit: 100,
            retrieval: RetrievalMode::PrimaryToken,
            index_prefixes: false,
            max_prefix_tokens: crate::search::indexer::DEFAULT_MAX_PREFIX_TOKENS,
            popularity_file: None,
        }
    }
}

impl SearchConfig {
    /// Engine settings for this configuration / 转换为引擎设置
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            retrieval: self.retrieval,
            indexer: Indexer {
                prefixes: self.index_prefixes,
                max_prefix_tokens: self.max_prefix_tokens,
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scan_cap == 0 {
            return Err(SearchError::Config("search.scan_cap must be positive".to_string()));
        }
        if self.default_limit == 0 {
            return Err(SearchError::Config("search.default_limit must be positive".to_string()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Get the full data directory path / 获取完整的数据目录路径
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Get the registry database path / 获取登记库路径
    pub fn get_database_path(&self) -> PathBuf {
        self.get_data_dir().join(&self.database.db_file)
    }

    /// Get the popularity table path, if configured / 获取常用度表路径
    pub fn get_popularity_path(&self) -> Option<PathBuf> {
        let file = self.search.popularity_file.as_deref()?;
        let path = Path::new(file);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(self.get_data_dir().join(path))
        }
    }
}

/// Get the config file path / 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&get_config_path())
}

/// Load configuration from a given path / 从指定路径加载配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig> {
    if config_path.exists() {
        // Load existing config / 加载现有配置
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| SearchError::Config(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| SearchError::Config(format!("Failed to parse config file: {}", e)))?;
        config.search.validate()?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        // Create default config / 创建默认配置
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| SearchError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(config_path, content)
        .map_err(|e| SearchError::Config(format!("Failed to write config file: {}", e)))?;

    Ok(())
}

/// Initialize global configuration from ./config.json / 初始化全局配置
pub fn init_config() -> Result<Arc<RwLock<AppConfig>>> {
    init_config_from(&get_config_path())
}

/// Initialize global configuration from a given path / 从指定路径初始化全局配置
pub fn init_config_from(config_path: &Path) -> Result<Arc<RwLock<AppConfig>>> {
    let config = load_config_from(config_path)?;

    let config_arc = Arc::new(RwLock::new(config));

    CONFIG
        .set(config_arc.clone())
        .map_err(|_| SearchError::Config("Config already initialized".to_string()))?;

    Ok(config_arc)
}

/// Get global configuration instance, loading ./config.json if not initialized / 获取全局配置实例
pub fn get_config() -> Result<Arc<RwLock<AppConfig>>> {
    CONFIG
        .get_or_try_init(|| load_config().map(|config| Arc::new(RwLock::new(config))))
        .cloned()
}

/// Get a read-only snapshot of current config / 获取当前配置的只读快照
pub fn config() -> Result<AppConfig> {
    Ok(get_config()?.read().clone())
}
