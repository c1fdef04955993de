//! Chat log persistence abstractions for Carechat.
//!
//! Defines the `ChatLogRepository` trait that the infrastructure layer
//! implements, and the service the reply path logs through.

pub mod repository;
pub mod service;
