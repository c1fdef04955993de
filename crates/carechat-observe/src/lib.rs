//! Observability for Carechat: structured logging via `tracing`.

pub mod tracing_setup;
