//! Business logic and repository trait definitions for Carechat.
//!
//! This crate defines session intake (registration validation, age
//! derivation) and the chat log "port" that the infrastructure layer
//! implements. It depends only on `carechat-types` -- never on
//! `carechat-infra` or any database/IO crate.

pub mod chat_log;
pub mod intake;
