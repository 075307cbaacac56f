use crate::crawler::Job;
use std::collections::VecDeque;
use std::fmt;

/// Tracks the state of a host during crawling
///
/// Holds the fetch jobs waiting for a free slot on this host and the number of
/// jobs currently running in the fetch pool. The scheduler owns one record per
/// host and only touches it under that host's lock.
pub struct HostState {
    /// Jobs waiting for admission, oldest first
    pending: VecDeque<Job>,

    /// Jobs for this host currently dispatched to the fetch pool
    in_flight: usize,
}

impl HostState {
    /// Creates a new HostState with an empty queue
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: 0,
        }
    }

    /// Appends a job to the back of the queue
    pub fn enqueue(&mut self, job: Job) {
        self.pending.push_back(job);
    }

    /// Checks if another job may be dispatched under the given cap
    pub fn can_dispatch(&self, per_host: usize) -> bool {
        self.in_flight < per_host
    }

    /// Pops the oldest pending job if a slot is free
    ///
    /// The caller must either call [`HostState::mark_dispatched`] once the job
    /// has been accepted by the pool, or drop the job.
    pub fn next_admissible(&mut self, per_host: usize) -> Option<Job> {
        if self.can_dispatch(per_host) {
            self.pending.pop_front()
        } else {
            None
        }
    }

    /// Records that a job was accepted by the fetch pool
    pub fn mark_dispatched(&mut self) {
        self.in_flight += 1;
    }

    /// Records that a dispatched job has finished
    pub fn finish(&mut self) {
        debug_assert!(self.in_flight > 0, "finish() without a dispatched job");
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Number of jobs currently running for this host
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of jobs waiting for admission
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for HostState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostState")
            .field("pending", &self.pending.len())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}
