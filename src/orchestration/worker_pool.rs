//! Bounded worker pool shared by batch runs.
//!
//! The pool is a fair semaphore: a record task must hold a [`WorkerPermit`]
//! while it talks to the store, and tasks beyond capacity wait in FIFO order
//! instead of failing. Clones share the same permits, so one pool can serve
//! every batch in the process.

use crate::constants::system;
use crate::error::{ReprocessorError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

static SHARED_POOL: OnceLock<WorkerPool> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
    in_flight: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a pool with `size` workers (at least one)
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Process-wide pool with the default size, created on first use
    pub fn shared() -> Self {
        SHARED_POOL
            .get_or_init(|| {
                debug!(
                    size = system::DEFAULT_WORKER_POOL_SIZE,
                    "Creating shared worker pool"
                );
                WorkerPool::new(system::DEFAULT_WORKER_POOL_SIZE)
            })
            .clone()
    }

    /// Wait for a free worker
    pub async fn acquire(&self) -> Result<WorkerPermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ReprocessorError::WorkerPoolClosed)?;

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Ok(WorkerPermit {
            _permit: permit,
            in_flight: self.in_flight.clone(),
        })
    }

    /// Stop handing out workers.
    ///
    /// Waiting and future [`acquire`](Self::acquire) calls fail with
    /// [`ReprocessorError::WorkerPoolClosed`]. Permits already held stay valid
    /// until dropped. Clones share the semaphore, so closing one closes all.
    pub fn close(&self) {
        debug!(size = self.size, in_flight = self.in_flight(), "Closing worker pool");
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available_workers(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of permits currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// A held worker slot, released on drop
#[derive(Debug)]
pub struct WorkerPermit {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_zero_size_is_clamped() {
        let pool = WorkerPool::new(0);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.available_workers(), 1);
    }

    #[test]
    fn test_shared_pool_is_reused() {
        let first = WorkerPool::shared();
        let second = WorkerPool::shared();
        assert!(Arc::ptr_eq(&first.semaphore, &second.semaphore));
        assert_eq!(first.size(), system::DEFAULT_WORKER_POOL_SIZE);
    }

    #[tokio::test]
    async fn test_permits_are_released_on_drop() {
        let pool = WorkerPool::new(2);
        let first = pool.acquire().await.unwrap();
        let _second = pool.acquire().await.unwrap();
        assert_eq!(pool.available_workers(), 0);
        assert_eq!(pool.in_flight(), 2);

        drop(first);
        assert_eq!(pool.available_workers(), 1);
        assert_eq!(pool.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_pool_queues_instead_of_failing() {
        let pool = WorkerPool::new(1);
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_closed_pool_rejects_new_and_waiting_acquires() {
        let pool = WorkerPool::new(1);
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        pool.close();
        assert!(pool.is_closed());
        assert!(matches!(
            waiter.await.unwrap(),
            Err(ReprocessorError::WorkerPoolClosed)
        ));
        assert!(matches!(
            pool.acquire().await,
            Err(ReprocessorError::WorkerPoolClosed)
        ));

        // The permit held before closing is still accounted for
        assert_eq!(pool.in_flight(), 1);
        drop(held);
        assert_eq!(pool.in_flight(), 0);
    }
}
