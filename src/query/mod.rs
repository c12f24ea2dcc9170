//! Query service
//!
//! Read-only access to the entity store: pagination, lookup by id,
//! field-filtered search, sub-record listings.

pub mod errors;
pub mod filters;
pub mod service;

pub use errors::{QueryError, QueryResult};
pub use filters::ClientFilter;
pub use service::{Page, QueryService};
