//! Per-host admission control for fetch jobs
//!
//! This module handles:
//! - One FIFO queue and in-flight counter per host
//! - Admitting queued jobs into the fetch pool without exceeding the per-host cap
//! - Re-admitting the next queued job whenever a dispatched one finishes
//!
//! Hosts are locked independently; a busy host never blocks another.

use crate::crawler::pool::{Job, WorkerPool};
use crate::state::HostState;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scheduler gating fetch jobs per host
pub struct HostScheduler {
    /// Pool that runs admitted jobs
    pool: Arc<WorkerPool>,

    /// Maximum concurrently running jobs per host
    per_host: usize,

    /// Per-host state, created lazily and never removed
    hosts: DashMap<String, Arc<Mutex<HostState>>>,
}

impl HostScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `pool` - The fetch pool that admitted jobs run on
    /// * `per_host` - Per-host concurrency cap (at least 1)
    pub fn new(pool: Arc<WorkerPool>, per_host: usize) -> Self {
        debug_assert!(per_host > 0, "per-host cap must be positive");
        Self {
            pool,
            per_host,
            hosts: DashMap::new(),
        }
    }

    /// Queues a fetch job for `host` and admits as many jobs as the cap allows
    ///
    /// Jobs for one host are admitted in submission order. A job rejected by a
    /// shut-down pool is dropped without running.
    pub fn submit<F>(self: &Arc<Self>, host: &str, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.host_state(host);
        let mut state = state.lock();
        state.enqueue(Box::pin(job));
        self.dispatch_ready(host, &mut state);
    }

    /// Releases a slot for `host` and admits the next queued job, if any
    ///
    /// Called exactly once per dispatched job, after it completes.
    pub fn on_job_finished(self: &Arc<Self>, host: &str) {
        let Some(state) = self.hosts.get(host).map(|entry| Arc::clone(entry.value())) else {
            tracing::warn!("Job finished for unknown host {}", host);
            return;
        };

        let mut state = state.lock();
        state.finish();
        self.dispatch_ready(host, &mut state);
    }

    /// Dispatches queued jobs while the host is below its cap
    ///
    /// Must be called with the host's lock held.
    fn dispatch_ready(self: &Arc<Self>, host: &str, state: &mut HostState) {
        while let Some(job) = state.next_admissible(self.per_host) {
            let slot = HostSlot {
                scheduler: Arc::clone(self),
                host: host.to_string(),
                armed: Arc::new(AtomicBool::new(true)),
            };
            let armed = Arc::clone(&slot.armed);

            // The slot travels with the job, so it is freed even if the pool
            // drops the job without polling it
            let admitted: Job = Box::pin(async move {
                let _slot = slot;
                job.await;
            });

            match self.pool.try_submit(admitted) {
                Ok(()) => state.mark_dispatched(),
                Err((e, rejected)) => {
                    tracing::debug!("Dropping queued fetch for {}: {}", host, e);
                    // Never counted as in flight; the lock is still held here
                    armed.store(false, Ordering::Release);
                    drop(rejected);
                }
            }
        }
    }

    /// Gets or creates the state record for a host
    fn host_state(&self, host: &str) -> Arc<Mutex<HostState>> {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HostState::new())))
            .clone()
    }

    /// Number of jobs for `host` currently running
    pub fn in_flight(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|entry| entry.value().lock().in_flight())
            .unwrap_or(0)
    }

    /// Number of jobs for `host` waiting for admission
    pub fn pending(&self, host: &str) -> usize {
        self.hosts
            .get(host)
            .map(|entry| entry.value().lock().pending())
            .unwrap_or(0)
    }

    /// Number of distinct hosts seen so far
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Returns the per-host cap
    pub fn per_host(&self) -> usize {
        self.per_host
    }
}

/// Occupied slot of a dispatched job; frees it on drop, including on panic
///
/// A slot whose job the pool refused is disarmed and frees nothing.
struct HostSlot {
    scheduler: Arc<HostScheduler>,
    host: String,
    armed: Arc<AtomicBool>,
}

impl Drop for HostSlot {
    fn drop(&mut self) {
        if self.armed.load(Ordering::Acquire) {
            self.scheduler.on_job_finished(&self.host);
        }
    }
}
