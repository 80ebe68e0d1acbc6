//! API Handlers
//!
//! Every path is an item address, so a single handler serves the whole
//! address space and dispatches on the HTTP method.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    Json,
};
use tracing::{info, warn};

use crate::cache::Cache;
use crate::config::Config;
use crate::coordinator::{CoordinatorOptions, RequestCoordinator};
use crate::error::{GatewayError, Result};
use crate::storage::{Engine, FileEngine, Item, MemoryEngine, StoreGateway};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RequestCoordinator>,
}

impl AppState {
    /// Creates a new AppState around an existing coordinator.
    pub fn new(coordinator: RequestCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Wires cache, gateway and coordinator over `engine`.
    pub async fn with_engine(config: &Config, engine: Arc<dyn Engine>) -> Result<Self> {
        let gateway = StoreGateway::open(engine, config.default_table.clone()).await?;
        let cache = Cache::new(config.cache_ttl(), config.cache_max_entries);
        let coordinator = RequestCoordinator::new(
            cache,
            Arc::new(gateway),
            CoordinatorOptions::from_config(config),
        );
        Ok(Self::new(coordinator))
    }

    /// Opens the engine named by the configuration and builds the state.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let engine: Arc<dyn Engine> = match &config.file_path {
            Some(path) => {
                info!(path = %path.display(), "using file-backed store");
                Arc::new(FileEngine::open(path).await?)
            }
            None => {
                warn!("FILE_PATH not set, items are kept in memory only");
                Arc::new(MemoryEngine::new())
            }
        };
        Self::with_engine(config, engine).await
    }

    pub fn cache(&self) -> &Cache {
        self.coordinator.cache()
    }
}

/// Handler for every item path.
///
/// - `GET` reads the item (cache first, then store)
/// - `PATCH` writes the JSON body to the store and the cache
pub async fn item_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Item>> {
    let path = uri.path();

    match method {
        Method::GET => state.coordinator.read(path).await.map(Json),
        Method::PATCH => state.coordinator.write(path, &body).await.map(Json),
        other => Err(GatewayError::MethodNotAllowed(other.to_string())),
    }
}
