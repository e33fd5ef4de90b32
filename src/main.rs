use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tonearm_server::{
    seed_demo_library, AppConfig, CliConfig, FileConfig, RequestsLoggingLevel, ServerConfig,
    SqliteLibraryStore,
};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    match path.try_exists() {
        Ok(true) => Ok(path.to_path_buf()),
        Ok(false) => {
            // A db that does not exist yet is fine as long as its parent does.
            match path.parent() {
                Some(parent) if parent.as_os_str().is_empty() || parent.exists() => {
                    Ok(path.to_path_buf())
                }
                _ => Err(format!("Parent directory of {} does not exist", s)),
            }
        }
        Err(err) => Err(format!("Could not check path {}: {}", s, err)),
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Streaming library aggregation server")]
struct CliArgs {
    /// Path of the SQLite database file, created on first run.
    #[arg(value_parser = parse_path)]
    db_path: Option<PathBuf>,

    /// Port the HTTP server listens on.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// How much of each HTTP request to log.
    #[arg(long, default_value = "path")]
    logging_level: RequestsLoggingLevel,

    /// Directory with static frontend files to serve at the root path.
    #[arg(long)]
    frontend_dir_path: Option<String>,

    /// Optional TOML config file; its values override CLI arguments.
    #[arg(long, value_parser = parse_path)]
    config: Option<PathBuf>,

    /// Populate an empty database with demo data before serving.
    #[arg(long, default_value_t = false)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        seed: cli_args.seed,
    };

    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening library db at {:?}", config.db_path);
    let store = Arc::new(SqliteLibraryStore::new(&config.db_path)?);

    if config.seed {
        let inserted = seed_demo_library(store.as_ref())?;
        info!("Seeded {} demo rows", inserted);
    }

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level,
        port: config.port,
        frontend_dir_path: config.frontend_dir_path,
    };

    tonearm_server::run_server(server_config, store).await
}
