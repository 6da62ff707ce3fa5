// src/make/locks.rs
// Per-category execution locks for targets that mutate shared state

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct CategoryLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CategoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, category: &str) -> Arc<AsyncMutex<()>> {
        let Ok(mut locks) = self.locks.lock() else {
            // Poisoned map: hand out an unshared lock
            return Arc::new(AsyncMutex::new(()));
        };
        locks
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait until no other execution in `category` is running
    pub async fn acquire(&self, category: &str) -> OwnedMutexGuard<()> {
        self.lock_for(category).lock_owned().await
    }
}
