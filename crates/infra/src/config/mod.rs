//! Configuration loading
//!
//! This module provides utilities for loading [`keygate_domain::KeygateConfig`]
//! from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths, CONFIG_PATH_VAR};
