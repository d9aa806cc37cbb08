//! Storage module - encrypted local persistence.
//!
//! - Key-value backends (JSON file, in-memory)
//! - LocalCache: transparent encrypt-on-write / decrypt-on-read
//! - Record model and sync-status inference

pub mod backend;
pub mod cache;
pub mod record;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use cache::LocalCache;
pub use record::{remote_path, timestamp_now, validate_identifier, Record, SyncStatus};
