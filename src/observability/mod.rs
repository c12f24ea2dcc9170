//! Observability for registro
//!
//! Structured JSON logging for server lifecycle and committed mutations.

pub mod logger;

pub use logger::{Logger, Severity};
