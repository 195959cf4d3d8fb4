use axum::extract::FromRef;
use std::time::Instant;

use crate::catalog::GuardedCatalogGate;
use crate::selection::GuardedRandomSource;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog_gate: GuardedCatalogGate,
    pub random: GuardedRandomSource,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog_gate: GuardedCatalogGate,
        random: GuardedRandomSource,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_gate,
            random,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogGate {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_gate.clone()
    }
}

impl FromRef<ServerState> for GuardedRandomSource {
    fn from_ref(input: &ServerState) -> Self {
        input.random.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
