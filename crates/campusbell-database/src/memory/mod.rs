//! In-memory store implementations.
//!
//! Same semantics as the PostgreSQL repositories, backed by `Mutex`-guarded
//! collections. Used by tests and by local runs without a database.

pub mod device_token;
pub mod directory;
pub mod queue;
pub mod settings;

use std::sync::{Mutex, MutexGuard};

pub use device_token::InMemoryDeviceTokenStore;
pub use directory::InMemoryDirectory;
pub use queue::InMemoryQueueStore;
pub use settings::InMemorySettingsStore;

/// Lock a collection, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
