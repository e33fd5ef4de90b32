use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::library::LibraryStore;

use super::ServerConfig;

pub type GuardedLibraryStore = Arc<dyn LibraryStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub library_store: GuardedLibraryStore,
}

impl ServerState {
    pub fn new(config: ServerConfig, library_store: GuardedLibraryStore) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            library_store,
        }
    }
}

impl FromRef<ServerState> for GuardedLibraryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.library_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
