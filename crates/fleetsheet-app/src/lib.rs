//! Application service layer - pipeline, config, export, upload server

pub mod app;
pub mod config;
pub mod export;
pub mod server;
