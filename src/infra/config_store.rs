//! Usage: Client config file persistence (flavor-aware load/write of server maps).

mod codex_toml;
mod json_doc;
mod paths;
mod store;

pub use store::{ConfigStore, FileConfigStore};
