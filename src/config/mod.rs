mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that participate in config resolution; mirrors the fields a
/// TOML config file can override.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub seed: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub seed: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified on the command line or in config file")
            })?;

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let seed = file.seed.unwrap_or(cli.seed);

        Ok(Self {
            db_path,
            port,
            logging_level,
            frontend_dir_path,
            seed,
        })
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
