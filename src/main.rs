use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pfsearch::config;
use pfsearch::models::PersonRecord;
use pfsearch::search::{PopularityTable, SearchEngine};
use pfsearch::storage::{RecordStore, SqliteRegistry};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(name = "pfsearch", version, about = "Name search over a missing-persons registry")]
struct Cli {
    /// Path to config.json (defaults to ./config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Search a repository by name
    Search {
        repo: String,
        query: String,
        /// Maximum results (defaults to search.default_limit)
        limit: Option<usize>,
    },
    /// Index a JSON array of person records into a repository
    Reindex { repo: String, file: PathBuf },
    /// Print index statistics of a repository
    Stats { repo: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pfsearch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        "pfsearch {} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME")
    );

    // Load configuration / 加载配置
    let loaded = match &cli.config {
        Some(path) => config::init_config_from(path),
        None => config::init_config(),
    };
    loaded.context("Failed to load configuration")?;
    let app_config = config::config()?;

    let db_path = app_config.get_database_path();
    let registry = SqliteRegistry::open(&db_path, app_config.search.scan_cap)
        .await
        .with_context(|| format!("Failed to open registry database {:?}", db_path))?;
    let store: Arc<dyn RecordStore> = Arc::new(registry);

    // 常用度表：配置文件优先，否则用内置表
    let popularity = match app_config.get_popularity_path() {
        Some(path) => Arc::new(
            PopularityTable::load(&path)
                .with_context(|| format!("Failed to load popularity table {:?}", path))?,
        ),
        None => PopularityTable::builtin(),
    };

    let engine = SearchEngine::new(store.clone(), app_config.search.settings(), popularity);

    match cli.command {
        Commands::Search { repo, query, limit } => {
            let limit = limit.unwrap_or(app_config.search.default_limit);
            let results = engine.search(&repo, &query, limit).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Reindex { repo, file } => {
            let records = read_records(&repo, &file)?;
            let indexed = engine.reindex_all(records).await?;
            let stats = store.stats(&repo).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "indexed": indexed,
                    "stats": stats,
                }))?
            );
        }
        Commands::Stats { repo } => {
            let stats = store.stats(&repo).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

/// Read a JSON array of person records, assigning the repo and any missing id / 读取待索引记录
fn read_records(repo: &str, path: &Path) -> anyhow::Result<Vec<PersonRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let mut records: Vec<PersonRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", path))?;

    let now = chrono::Utc::now().timestamp();
    for record in &mut records {
        record.repo = repo.to_string();
        if record.record_id.is_empty() {
            record.record_id = uuid::Uuid::new_v4().to_string();
        }
        if record.entry_date == 0 {
            record.entry_date = now;
        }
    }
    tracing::info!("Read {} records from {:?}", records.len(), path);
    Ok(records)
}
