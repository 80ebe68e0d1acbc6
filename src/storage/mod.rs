//! Storage Module
//!
//! Persistent engine capabilities, the bundled engines, and the gateway the
//! request coordinator reads and writes through.

mod engine;
mod file;
mod gateway;
mod memory;

pub use engine::{Engine, EngineError, Item, Table};
pub use file::FileEngine;
pub use gateway::StoreGateway;
pub use memory::{MemoryEngine, MemoryTable};
