//! State module for per-crawl bookkeeping
//!
//! # Components
//!
//! - `HostState`: FIFO of pending fetch jobs and the in-flight counter for one host
//! - `WorkTracker`: counts outstanding units of work so a crawl knows when it is done

mod host_state;
mod work_tracker;

// Re-export main types
pub use host_state::HostState;
pub use work_tracker::{WorkGuard, WorkTracker};
