//! Shared domain types for repochat.
//!
//! This crate contains the core domain types used across the repochat client:
//! repository references, ingestion states, chat turns, and their associated
//! error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod repo;
