//! HTTP client used by the identity provider adapters

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
