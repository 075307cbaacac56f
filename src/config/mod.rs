//! Configuration module for Runnel
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use runnel::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("runnel.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, HttpConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
