//! # REST API Module
//!
//! The HTTP boundary: decodes requests into typed commands for the
//! mutation pipeline and query service, encodes entities and errors
//! back. No business logic lives in the handlers.

pub mod audit;
pub mod clients;
pub mod consents;
pub mod errors;
pub mod server;

pub use errors::{ApiError, ApiResult};
pub use server::{build_router, serve, AppState};
