//! # Error Handling
//!
//! Error handling for querygate. Clause application propagates collaborator
//! failures unchanged; the variants here cover construction-time
//! misconfiguration and the failures of the bundled SQL collaborator.

pub mod types;

pub use types::{QueryGateError, Result};
