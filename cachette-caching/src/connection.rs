//! Connection lifecycle shared by the networked drivers

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Connection state of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No substrate operation has run yet
    Unconnected,

    /// The connection is established and will be reused for every operation
    Connected,
}

/// A connection established on first use and never re-established
///
/// The transition `Unconnected -> Connected` happens once. A failed attempt
/// leaves the state `Unconnected` so the next operation tries again; a
/// connection that dies after it was established is not replaced and its
/// errors surface from the operations that use it.
pub struct LazyConnection<C> {
    cell: OnceCell<C>,
}

impl<C> LazyConnection<C> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.cell.initialized() {
            ConnectionState::Connected
        } else {
            ConnectionState::Unconnected
        }
    }

    /// Get the live connection, running `connect` if there is none yet
    pub async fn get_or_connect<F, Fut, E>(&self, connect: F) -> Result<&C, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, E>>,
    {
        self.cell.get_or_try_init(connect).await
    }
}

impl<C> Default for LazyConnection<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry of named, shared resources
///
/// Used for persistent server pools and reusable database clients.
pub struct PoolRegistry<T> {
    pools: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> PoolRegistry<T> {
    pub fn new() -> Self {
        Self {
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Get the resource registered under `name`
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.pools.lock().get(name).cloned()
    }

    /// Get the resource under `name`, creating it with `init` if absent
    pub fn get_or_insert_with(&self, name: &str, init: impl FnOnce() -> T) -> Arc<T> {
        self.pools
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(init()))
            .clone()
    }

    /// Register `value` under `name` unless another caller got there first
    ///
    /// Returns whichever resource ends up registered.
    pub fn get_or_insert(&self, name: &str, value: T) -> Arc<T> {
        self.get_or_insert_with(name, || value)
    }

    pub fn len(&self) -> usize {
        self.pools.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.lock().is_empty()
    }
}

impl<T> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_connects_once() {
        let connection: LazyConnection<usize> = LazyConnection::new();
        let attempts = AtomicUsize::new(0);
        assert_eq!(connection.state(), ConnectionState::Unconnected);

        for _ in 0..3 {
            let value = connection
                .get_or_connect(|| async {
                    Ok::<_, String>(attempts.fetch_add(1, Ordering::SeqCst) + 10)
                })
                .await
                .unwrap();
            assert_eq!(*value, 10);
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(connection.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_failed_connect_stays_unconnected() {
        let connection: LazyConnection<usize> = LazyConnection::new();

        let result = connection
            .get_or_connect(|| async { Err::<usize, _>("refused".to_string()) })
            .await;
        assert_eq!(result.unwrap_err(), "refused");
        assert_eq!(connection.state(), ConnectionState::Unconnected);

        let value = connection
            .get_or_connect(|| async { Ok::<_, String>(7) })
            .await
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(connection.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_registry_shares_by_name() {
        let registry: PoolRegistry<Mutex<Vec<u16>>> = PoolRegistry::new();

        let first = registry.get_or_insert_with("sessions", || Mutex::new(vec![1]));
        first.lock().push(2);

        let second = registry.get_or_insert("sessions", Mutex::new(vec![9]));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second.lock(), vec![1, 2]);

        assert!(registry.get("pages").is_none());
        assert_eq!(registry.len(), 1);
    }
}
