//! Durable key-value persistence behind the session store.
//!
//! The session logic only sees [`KeyValueStore`]; the medium (process
//! memory, a JSON file on disk, something encrypted) is swappable.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ClientResult;

/// String-keyed persistence with synchronous reads and writes.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> ClientResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        (**self).remove(key)
    }
}
