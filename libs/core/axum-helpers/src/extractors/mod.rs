//! Custom extractors for Axum handlers.
//!
//! Both extractors run `validator` rules after deserialization and reject
//! with the standard [`ErrorResponse`](crate::errors::ErrorResponse) body.

pub mod validated_json;
pub mod validated_query;

pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
