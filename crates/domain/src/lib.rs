//! # Keygate Domain
//!
//! Identity and token domain types for Keygate.
//!
//! This crate contains:
//! - Token and identity data types (`TokenPair`, `TokenClaims`,
//!   `OAuthUserInfo`, ...)
//! - The `AuthError` taxonomy and `Result` alias
//! - Configuration structures
//! - Domain constants (default TTLs, provider endpoints)
//!
//! ## Architecture
//! - No dependencies on other Keygate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
