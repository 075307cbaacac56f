//! URL handling module for Runnel
//!
//! Provides the host key used to group resources for per-host concurrency.

mod domain;

pub use domain::{extract_domain, host_of};
