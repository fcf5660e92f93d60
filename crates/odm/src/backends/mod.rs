//! Store Backends
//!
//! The persistence collaborator trait plus the bundled in-memory store.
//! Other key-value stores plug in by implementing `DocumentStore`.

pub mod core;
pub mod memory;

pub use core::*;
pub use memory::MemoryStore;
