//! Domain services for fleet reconciliation
//!
//! Everything here is pure: no network, no filesystem.

pub mod service;
