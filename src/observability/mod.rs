//! # Observability Infrastructure
//!
//! Structured logging for querygate. Clause application and filter decisions
//! emit `tracing` events; the host application decides whether to install
//! the subscriber provided here or its own.

pub mod logging;

pub use logging::init_tracing;
