//! Usage: Infrastructure adapters (config file store, HTTP clients).

pub mod cloud_api;
pub mod config_store;
pub mod registry;
