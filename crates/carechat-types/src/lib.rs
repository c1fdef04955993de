//! Shared domain types for Carechat.
//!
//! Registration input and its validated form, chat log entries, store
//! configuration, and the store error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror, secrecy, url.

pub mod chat_log;
pub mod config;
pub mod error;
pub mod registration;
