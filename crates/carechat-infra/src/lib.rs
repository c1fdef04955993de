//! Infrastructure layer for Carechat.
//!
//! Contains the sqlx-backed implementation of the `ChatLogRepository` trait
//! defined in `carechat-core`, along with its pool lifecycle, schema setup,
//! and configuration loading.

pub mod config;
pub mod store;
