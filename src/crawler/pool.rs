//! Fixed-size worker pool
//!
//! A pool spawns `size` long-lived worker tasks that pull jobs from one shared,
//! unbounded queue. Submitting never waits; each worker runs one job at a time,
//! so at most `size` jobs execute concurrently.

use crate::{Error, PoolError};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A unit of work executed by a [`WorkerPool`]
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>;

/// Bounded pool of worker tasks
pub struct WorkerPool {
    /// Name used in logs and errors
    name: &'static str,

    /// Number of workers
    size: usize,

    /// Queue sender; `None` once the pool is shut down
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,

    /// Worker task handles, taken by [`WorkerPool::join`]
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Creates a pool and spawns its workers
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - Pool with `size` running workers
    /// * `Err(Error::InvalidArgument)` - `size` is zero
    pub fn new(name: &'static str, size: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidArgument(format!(
                "{} pool size must be at least 1",
                name
            )));
        }

        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers: Vec<JoinHandle<()>> = (0..size)
            .map(|id| tokio::spawn(run_worker(name, id, Arc::clone(&receiver))))
            .collect();

        tracing::debug!("Started {} pool with {} workers", name, size);

        Ok(Self {
            name,
            size,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    /// Queues a job for execution
    ///
    /// On rejection the job is dropped without being polled.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.try_submit(Box::pin(job)).map_err(|(e, _job)| e)
    }

    /// Queues a job for execution, handing it back if the pool is shut down
    ///
    /// The caller decides when the rejected job is dropped, e.g. after
    /// releasing locks its destructor needs.
    pub fn try_submit(&self, job: Job) -> Result<(), (PoolError, Job)> {
        let rejected = PoolError::ShutDown { pool: self.name };
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx.send(job).map_err(|e| (rejected, e.0)),
            None => Err((rejected, job)),
        }
    }

    /// Stops accepting jobs; queued and running jobs still complete
    ///
    /// Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_some() {
            tracing::debug!("{} pool shutting down", self.name);
        }
    }

    /// Returns whether [`WorkerPool::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Waits for all workers to exit
    ///
    /// Workers exit once the pool is shut down and the queue is drained, so
    /// this only returns after [`WorkerPool::shutdown`].
    pub async fn join(&self) {
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("{} worker ended abnormally: {}", self.name, e);
            }
        }
    }

    /// Returns the pool name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of workers
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_worker(name: &'static str, id: usize, receiver: SharedReceiver) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            break;
        };

        // Run on its own task so a panicking job does not take the worker down
        if let Err(e) = tokio::spawn(job).await {
            if e.is_panic() {
                tracing::error!("{} worker {} job panicked", name, id);
            }
        }
    }

    tracing::trace!("{} worker {} exiting", name, id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_size_is_rejected() {
        assert!(matches!(
            WorkerPool::new("fetch", 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_runs_submitted_jobs() {
        let pool = WorkerPool::new("fetch", 2).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        pool.join().await;
        assert_eq!(done.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_size() {
        let pool = WorkerPool::new("extract", 3).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            pool.submit(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        pool.join().await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let pool = WorkerPool::new("fetch", 1).unwrap();
        pool.shutdown();
        assert!(pool.is_shut_down());

        let result = pool.submit(async {});
        assert!(matches!(result, Err(PoolError::ShutDown { pool: "fetch" })));
    }

    #[tokio::test]
    async fn test_try_submit_hands_back_rejected_job() {
        let pool = WorkerPool::new("fetch", 1).unwrap();
        pool.shutdown();

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let job: Job = Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let Err((error, job)) = pool.try_submit(job) else {
            panic!("shut-down pool accepted a job");
        };
        assert!(matches!(error, PoolError::ShutDown { pool: "fetch" }));

        job.await;
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let pool = WorkerPool::new("fetch", 2).unwrap();
        pool.shutdown();
        pool.shutdown();
        tokio::time::timeout(Duration::from_secs(1), pool.join())
            .await
            .expect("join hung after shutdown");
    }

    #[tokio::test]
    async fn test_panicking_job_keeps_worker_alive() {
        let pool = WorkerPool::new("extract", 1).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        pool.submit(async {
            panic!("boom");
        })
        .unwrap();
        let counter = Arc::clone(&done);
        pool.submit(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.shutdown();
        pool.join().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_accessors() {
        let pool = WorkerPool::new("fetch", 4).unwrap();
        assert_eq!(pool.name(), "fetch");
        assert_eq!(pool.size(), 4);
        assert!(!pool.is_shut_down());
    }
}
