//! Relational chat log storage.
//!
//! `ChatLogStore` owns the pool lifecycle and implements `ChatLogRepository`
//! from `carechat-core` over PostgreSQL or SQLite via sqlx.

pub mod chat_log;
pub mod pool;
pub mod schema;

pub use chat_log::{ChatLogStore, StoreStatus};
