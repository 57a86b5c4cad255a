//! HTTP client for the remote answering service.

pub mod client;
pub mod types;

pub use client::HttpRagClient;
