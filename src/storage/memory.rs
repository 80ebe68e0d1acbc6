//! In-memory engine, used when no store file is configured.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::engine::{Engine, EngineError, Item, Table};

pub struct MemoryTable {
    name: String,
    items: RwLock<HashMap<String, Item>>,
}

impl MemoryTable {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has(&self, item_id: &str) -> Result<bool, EngineError> {
        Ok(self.items.read().contains_key(item_id))
    }

    async fn get(&self, item_id: &str) -> Result<Option<Item>, EngineError> {
        Ok(self.items.read().get(item_id).cloned())
    }

    async fn set(&self, item_id: &str, value: Item) -> Result<Item, EngineError> {
        self.items.write().insert(item_id.to_string(), value.clone());
        Ok(value)
    }
}

#[derive(Default)]
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, Arc<MemoryTable>>>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access to a table's data, bypassing any gateway.
    pub fn table(&self, table_id: &str) -> Arc<MemoryTable> {
        self.tables
            .write()
            .entry(table_id.to_string())
            .or_insert_with(|| Arc::new(MemoryTable::new(table_id)))
            .clone()
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn open_table(&self, table_id: &str) -> Result<Arc<dyn Table>, EngineError> {
        let table: Arc<dyn Table> = self.table(table_id);
        Ok(table)
    }
}
