//! HTTP request handlers for the REST API.

pub mod chat_log;
pub mod health;
pub mod session;
