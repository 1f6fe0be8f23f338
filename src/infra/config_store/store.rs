//! Usage: `ConfigStore` seam + file-backed implementation.

use std::sync::Arc;

use crate::clients::{self, DisabledStyle};
use crate::mcp::ServerPartition;
use crate::shared::fs::{read_optional_file, write_file_atomic_if_changed};

use super::codex_toml;
use super::json_doc::{self, JsonFlavor};
use super::paths;

/// Persistence boundary for one client's config file. The file store below is
/// the production implementation; tests substitute in-memory fakes.
pub trait ConfigStore: Send + Sync {
    fn load(&self, client_key: &str, path: Option<&str>) -> Result<ServerPartition, String>;

    fn write(
        &self,
        client_key: &str,
        path: Option<&str>,
        partition: &ServerPartition,
    ) -> Result<(), String>;
}

impl<S: ConfigStore> ConfigStore for Arc<S> {
    fn load(&self, client_key: &str, path: Option<&str>) -> Result<ServerPartition, String> {
        (**self).load(client_key, path)
    }

    fn write(
        &self,
        client_key: &str,
        path: Option<&str>,
        partition: &ServerPartition,
    ) -> Result<(), String> {
        (**self).write(client_key, path, partition)
    }
}

fn json_flavor(style: DisabledStyle) -> Option<JsonFlavor> {
    match style {
        DisabledStyle::SplitMap => Some(JsonFlavor::Split),
        DisabledStyle::DisabledFlag => Some(JsonFlavor::DisabledFlag),
        DisabledStyle::ActiveFlag => Some(JsonFlavor::ActiveFlag),
        DisabledStyle::TomlEnabledFlag => None,
    }
}

/// Reads and patches the clients' own config files in place: unknown
/// top-level content survives, writes are atomic and skipped when nothing
/// changed, and a missing file loads as an empty partition.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigStore;

impl FileConfigStore {
    pub fn new() -> Self {
        FileConfigStore
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self, client_key: &str, path: Option<&str>) -> Result<ServerPartition, String> {
        let file = paths::config_path(client_key, path)?;
        let hint = file.display().to_string();

        let Some(bytes) = read_optional_file(&file)? else {
            return Ok(ServerPartition::new());
        };

        match json_flavor(clients::disabled_style(client_key)) {
            Some(flavor) => json_doc::partition_from_json(&bytes, flavor, &hint),
            None => codex_toml::partition_from_toml(&bytes, &hint),
        }
    }

    fn write(
        &self,
        client_key: &str,
        path: Option<&str>,
        partition: &ServerPartition,
    ) -> Result<(), String> {
        let file = paths::config_path(client_key, path)?;
        let hint = file.display().to_string();

        let current = read_optional_file(&file)?;
        let next = match json_flavor(clients::disabled_style(client_key)) {
            Some(flavor) => {
                json_doc::patch_json(current.as_deref(), flavor, partition, &hint)?
            }
            None => codex_toml::patch_toml(current.as_deref(), partition, &hint)?,
        };

        let changed = write_file_atomic_if_changed(&file, &next)?;
        if changed {
            tracing::debug!(client = %client_key, file = %hint, "config file updated");
        }
        Ok(())
    }
}
