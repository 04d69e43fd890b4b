//! Infrastructure layer
//!
//! Fleet API clients (token cache, vehicle fetch, label colors) and the
//! client CSV loader.

pub mod api;
pub mod client_csv;
