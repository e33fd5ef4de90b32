pub mod config;
pub mod library;
pub mod server;
pub mod sqlite_persistence;

pub use config::{AppConfig, CliConfig, FileConfig};
pub use library::{seed_demo_library, LibraryStore, SqliteLibraryStore, StoreError};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
