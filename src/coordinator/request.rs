//! Request Coordinator
//!
//! Cache-aside reads and write-through writes for one addressed item.
//!
//! Reads answer from the cache when they can and otherwise fall back to the
//! store, populating the cache on the way out. Writes go to the store first and
//! only then overwrite the cache with the value the store confirmed.
//!
//! Store access and the cache update that follows it run under the item's key
//! lock, so a slow miss can never put a pre-write value back into the cache
//! after a write has completed. Cache hits take no lock.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::locks::KeyLocks;
use crate::address::{self, Address, ResolvedAddress};
use crate::cache::Cache;
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::storage::{Item, StoreGateway};

// == Coordinator Options ==
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub use_multi_table: bool,
    pub default_table: String,
    pub allow_patch_to_create_new_item: bool,
}

impl CoordinatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            use_multi_table: config.use_multi_table,
            default_table: config.default_table.clone(),
            allow_patch_to_create_new_item: config.allow_patch_to_create_new_item,
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Request Coordinator ==
pub struct RequestCoordinator {
    cache: Cache,
    gateway: Arc<StoreGateway>,
    locks: KeyLocks,
    options: CoordinatorOptions,
}

impl RequestCoordinator {
    pub fn new(cache: Cache, gateway: Arc<StoreGateway>, options: CoordinatorOptions) -> Self {
        Self {
            cache,
            gateway,
            locks: KeyLocks::new(),
            options,
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    // == Read ==
    /// Serves a GET for `path`.
    pub async fn read(&self, path: &str) -> Result<Item> {
        let resolved = self.route(path)?;
        let address = &resolved.address;
        let key = address.cache_key();

        if let Some(item) = self.cache.get(&key) {
            debug!(%address, "cache hit");
            return Ok(item);
        }

        let _guard = self.locks.lock(&key).await;

        // a write or another miss may have filled the entry while we waited
        if let Some(item) = self.cache.peek(&key) {
            debug!(%address, "cache filled while waiting");
            return Ok(item);
        }

        debug!(%address, default_table = resolved.using_default_table, "cache miss");

        let exists = self
            .gateway
            .has(address)
            .await
            .inspect_err(|e| report(address, "has", e))?;
        if !exists {
            return Err(GatewayError::NotFound(address.to_string()));
        }

        let item = self
            .gateway
            .get(address)
            .await
            .inspect_err(|e| report(address, "get", e))?;

        if let Err(e) = self.cache.set(&key, item.clone(), None) {
            warn!(%address, error = %e, "cache population skipped");
        }

        Ok(item)
    }

    // == Write ==
    /// Serves a PATCH for `path` with the raw request `body`.
    pub async fn write(&self, path: &str, body: &[u8]) -> Result<Item> {
        let resolved = self.route(path)?;
        let value = parse_body(body)?;
        let address = &resolved.address;
        let key = address.cache_key();

        let _guard = self.locks.lock(&key).await;

        if !self.options.allow_patch_to_create_new_item {
            let exists = self
                .gateway
                .has(address)
                .await
                .inspect_err(|e| report(address, "has", e))?;
            if !exists {
                return Err(GatewayError::NotFoundOnPatch(address.to_string()));
            }
        }

        let stored = self
            .gateway
            .set(address, value)
            .await
            .inspect_err(|e| report(address, "set", e))?;

        if let Err(e) = self.cache.set(&key, stored.clone(), None) {
            // the old entry would now contradict the store
            self.cache.remove(&key);
            warn!(%address, error = %e, "cache update skipped, entry invalidated");
        }

        debug!(%address, "item written");
        Ok(stored)
    }

    fn route(&self, path: &str) -> Result<ResolvedAddress> {
        address::resolve(path, self.options.use_multi_table, &self.options.default_table)
            .inspect_err(|e| debug!(path, error = %e, "unroutable path"))
            .map_err(GatewayError::from)
    }
}

/// Empty, whitespace-only and `null` bodies count as absent.
fn parse_body(body: &[u8]) -> Result<Item> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::EmptyBody);
    }

    let value: Item =
        serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
    if value.is_null() {
        return Err(GatewayError::EmptyBody);
    }
    Ok(value)
}

fn report(address: &Address, operation: &'static str, err: &GatewayError) {
    if let GatewayError::Persistence(e) = err {
        error!(%address, operation, error = %e, "store operation failed");
    }
}
