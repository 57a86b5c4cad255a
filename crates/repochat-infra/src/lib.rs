//! Infrastructure layer for repochat.
//!
//! Contains the HTTP implementation of the `RagBackend` port defined in
//! `repochat-core`, OAuth callback token extraction, and configuration
//! loading.

pub mod auth;
pub mod config;
pub mod http;
