use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::normalize;

/// One async mutex per user login.
///
/// Read-modify-write sequences on a user's persisted state (token refresh,
/// playlist creation, code exchange) run while holding that user's guard.
/// Different users never contend with each other.
#[derive(Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the lock for `login` is free and returns its guard.
    /// The guard is not reentrant: never acquire twice on the same task.
    pub async fn acquire(&self, login: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(normalize(login)).or_default())
        };
        lock.lock_owned().await
    }
}
