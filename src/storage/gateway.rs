//! Store Gateway
//!
//! Routes addressed reads and writes to the right table handle. The default
//! table is opened once at startup; other tables are opened on first use and
//! pooled for the gateway's lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::engine::{Engine, EngineError, Item, Table};
use crate::address::Address;
use crate::error::{GatewayError, Result};

pub struct StoreGateway {
    engine: Arc<dyn Engine>,
    default_table_id: String,
    default_table: Arc<dyn Table>,
    /// Handles for every non-default table opened so far
    tables: RwLock<HashMap<String, Arc<dyn Table>>>,
}

impl StoreGateway {
    // == Open ==
    /// Opens the default table and returns a gateway over `engine`.
    pub async fn open(
        engine: Arc<dyn Engine>,
        default_table: impl Into<String>,
    ) -> std::result::Result<Self, EngineError> {
        let default_table_id = default_table.into();
        let default_table = engine.open_table(&default_table_id).await?;
        info!(table = %default_table_id, "default table opened");

        Ok(Self {
            engine,
            default_table_id,
            default_table,
            tables: RwLock::new(HashMap::new()),
        })
    }

    // == Has ==
    pub async fn has(&self, address: &Address) -> Result<bool> {
        let table = self.table(address).await?;
        Ok(table.has(&address.item_id).await?)
    }

    // == Get ==
    /// Fetches the item, failing with `NotFound` when it is absent.
    pub async fn get(&self, address: &Address) -> Result<Item> {
        let table = self.table(address).await?;
        table
            .get(&address.item_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(address.to_string()))
    }

    // == Set ==
    /// Upserts the item and returns the value the engine confirmed.
    pub async fn set(&self, address: &Address, value: Item) -> Result<Item> {
        let table = self.table(address).await?;
        Ok(table.set(&address.item_id, value).await?)
    }

    /// Number of pooled non-default table handles.
    pub fn open_tables(&self) -> usize {
        self.tables.read().len()
    }

    pub fn default_table(&self) -> &str {
        &self.default_table_id
    }

    async fn table(&self, address: &Address) -> std::result::Result<Arc<dyn Table>, EngineError> {
        if address.table_id == self.default_table_id {
            return Ok(self.default_table.clone());
        }

        let pooled = self.tables.read().get(&address.table_id).cloned();
        if let Some(table) = pooled {
            return Ok(table);
        }

        let opened = self.engine.open_table(&address.table_id).await?;
        debug!(table = %opened.name(), "table handle opened");

        // another request may have opened it meanwhile; keep the first one
        let mut tables = self.tables.write();
        Ok(tables
            .entry(address.table_id.clone())
            .or_insert(opened)
            .clone())
    }
}
