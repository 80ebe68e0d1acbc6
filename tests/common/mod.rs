//! Shared test doubles
//!
//! `ProbeEngine` wraps the in-memory engine, counts every store call, and can
//! be told to fail or to park `get` calls until released.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use table_cache::storage::{Engine, EngineError, Item, MemoryEngine, Table};
use table_cache::{AppState, Config};

pub struct Probe {
    pub has_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    /// When set, `get` signals `get_started` and waits on `release_get`
    pub hold_gets: AtomicBool,
    pub get_started: Notify,
    pub release_get: Semaphore,
}

impl Probe {
    fn new() -> Self {
        Self {
            has_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            set_calls: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            hold_gets: AtomicBool::new(false),
            get_started: Notify::new(),
            release_get: Semaphore::new(0),
        }
    }

    pub fn store_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
            + self.get_calls.load(Ordering::SeqCst)
            + self.set_calls.load(Ordering::SeqCst)
    }
}

pub struct ProbeEngine {
    memory: MemoryEngine,
    probe: Arc<Probe>,
}

impl ProbeEngine {
    pub fn new() -> (Arc<Self>, Arc<Probe>) {
        let probe = Arc::new(Probe::new());
        let engine = Arc::new(Self {
            memory: MemoryEngine::new(),
            probe: probe.clone(),
        });
        (engine, probe)
    }

    /// The wrapped engine, for seeding and inspecting data without probing.
    pub fn memory(&self) -> &MemoryEngine {
        &self.memory
    }
}

#[async_trait]
impl Engine for ProbeEngine {
    async fn open_table(&self, table_id: &str) -> Result<Arc<dyn Table>, EngineError> {
        let table: Arc<dyn Table> = Arc::new(ProbeTable {
            inner: self.memory.open_table(table_id).await?,
            probe: self.probe.clone(),
        });
        Ok(table)
    }
}

struct ProbeTable {
    inner: Arc<dyn Table>,
    probe: Arc<Probe>,
}

impl ProbeTable {
    fn check_read(&self) -> Result<(), EngineError> {
        if self.probe.fail_reads.load(Ordering::SeqCst) {
            return Err(EngineError::Io("read refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Table for ProbeTable {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn has(&self, item_id: &str) -> Result<bool, EngineError> {
        self.probe.has_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        self.inner.has(item_id).await
    }

    async fn get(&self, item_id: &str) -> Result<Option<Item>, EngineError> {
        self.probe.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        if self.probe.hold_gets.load(Ordering::SeqCst) {
            self.probe.get_started.notify_one();
            self.probe
                .release_get
                .acquire()
                .await
                .expect("release semaphore closed")
                .forget();
        }
        self.inner.get(item_id).await
    }

    async fn set(&self, item_id: &str, value: Item) -> Result<Item, EngineError> {
        self.probe.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe.fail_writes.load(Ordering::SeqCst) {
            return Err(EngineError::Io("write refused".into()));
        }
        self.inner.set(item_id, value).await
    }
}

pub async fn probed_state(config: Config) -> (AppState, Arc<ProbeEngine>, Arc<Probe>) {
    let (engine, probe) = ProbeEngine::new();
    let state = AppState::with_engine(&config, engine.clone())
        .await
        .expect("state builds over probe engine");
    (state, engine, probe)
}
