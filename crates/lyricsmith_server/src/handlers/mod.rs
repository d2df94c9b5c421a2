//! HTTP request handlers.

/// CORS headers and preflight responses.
pub mod cors;
pub(crate) mod normalize;
/// Song document endpoints.
pub mod songs;
