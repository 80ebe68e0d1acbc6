//! File-backed engine
//!
//! Keeps every table in one JSON document on disk:
//!
//! ```text
//! { "<table>": { "<item>": <value>, ... }, ... }
//! ```
//!
//! The document is loaded once at open and rewritten on each `set` through a
//! temporary file and a rename, so a crash mid-write leaves the previous
//! document intact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::engine::{Engine, EngineError, Item, Table};

type Document = BTreeMap<String, BTreeMap<String, Item>>;

struct Shared {
    path: PathBuf,
    document: Mutex<Document>,
}

impl Shared {
    async fn persist(&self, document: &Document) -> Result<(), EngineError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| EngineError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "store file written");
        Ok(())
    }
}

// == File Engine ==
#[derive(Clone)]
pub struct FileEngine {
    shared: Arc<Shared>,
}

impl FileEngine {
    /// Opens the store file at `path`. A missing file starts an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();

        let document: Document = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Document::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| EngineError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                Document::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            path = %path.display(),
            tables = document.len(),
            "store file opened"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                document: Mutex::new(document),
            }),
        })
    }
}

#[async_trait]
impl Engine for FileEngine {
    async fn open_table(&self, table_id: &str) -> Result<Arc<dyn Table>, EngineError> {
        let table: Arc<dyn Table> = Arc::new(FileTable {
            name: table_id.to_string(),
            shared: self.shared.clone(),
        });
        Ok(table)
    }
}

// == File Table ==
struct FileTable {
    name: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl Table for FileTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has(&self, item_id: &str) -> Result<bool, EngineError> {
        let document = self.shared.document.lock().await;
        Ok(document
            .get(&self.name)
            .is_some_and(|table| table.contains_key(item_id)))
    }

    async fn get(&self, item_id: &str) -> Result<Option<Item>, EngineError> {
        let document = self.shared.document.lock().await;
        Ok(document
            .get(&self.name)
            .and_then(|table| table.get(item_id))
            .cloned())
    }

    async fn set(&self, item_id: &str, value: Item) -> Result<Item, EngineError> {
        let mut document = self.shared.document.lock().await;
        let previous = document
            .entry(self.name.clone())
            .or_default()
            .insert(item_id.to_string(), value.clone());

        if let Err(e) = self.shared.persist(&document).await {
            // roll back so memory never runs ahead of disk
            let table = document.entry(self.name.clone()).or_default();
            match previous {
                Some(old) => {
                    table.insert(item_id.to_string(), old);
                }
                None => {
                    table.remove(item_id);
                    if table.is_empty() {
                        document.remove(&self.name);
                    }
                }
            }
            return Err(e);
        }

        Ok(value)
    }
}
