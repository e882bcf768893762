//! Error conversions from infrastructure crates into `AuthError`

mod conversions;

pub use conversions::{HttpError, InfraError};
