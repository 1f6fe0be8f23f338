//! Usage: Cloud backup/restore of the server partition (Pro-gated, key-gated).

use serde::{Deserialize, Serialize};

use crate::infra::config_store::ConfigStore;
use crate::tier::TierPolicy;

use super::coordinator::{acquire, McpCoordinator};
use super::types::{ServerConfig, ServerPartition};

/// One cloud-stored server config. The payload travels encrypted at the HTTP
/// layer; this type sees it already decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudServerEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub config: ServerConfig,
    #[serde(default)]
    pub disabled: bool,
}

/// Remote storage for per-user server configs (`/user-server-configs`).
/// Implemented by the HTTP adapter; tests swap in a fake.
#[allow(async_fn_in_trait)]
pub trait CloudStore {
    async fn list(&self) -> Result<Vec<CloudServerEntry>, String>;
    async fn upsert(&self, entries: &[CloudServerEntry]) -> Result<u32, String>;
    async fn delete(&self, id: i64) -> Result<(), String>;
}

fn ensure_cloud_access(policy: &TierPolicy, encryption_key: Option<&str>) -> Result<(), String> {
    if !policy.can_use_cloud_sync() {
        return Err(
            "TIER_UPGRADE_REQUIRED: cloud sync requires the Pro plan or higher".to_string(),
        );
    }
    if encryption_key.map(str::trim).filter(|k| !k.is_empty()).is_none() {
        return Err("SEC_INVALID_INPUT: encryption key is required".to_string());
    }
    Ok(())
}

impl<S: ConfigStore> McpCoordinator<S> {
    /// Push this pair's full partition to cloud storage. Returns the number
    /// of entries uploaded.
    pub async fn cloud_upload<C: CloudStore>(
        &self,
        policy: &TierPolicy,
        encryption_key: Option<&str>,
        cloud: &C,
    ) -> Result<u32, String> {
        let _guard = acquire(&self.syncing, "cloud sync")?;
        ensure_cloud_access(policy, encryption_key)?;

        let result = async {
            let partition = self.load()?;
            let mut entries = Vec::with_capacity(partition.len());
            for (name, config) in partition.active() {
                entries.push(CloudServerEntry {
                    id: None,
                    name: name.clone(),
                    config: config.clone(),
                    disabled: false,
                });
            }
            for (name, config) in partition.disabled() {
                entries.push(CloudServerEntry {
                    id: None,
                    name: name.clone(),
                    config: config.clone(),
                    disabled: true,
                });
            }
            cloud.upsert(&entries).await
        }
        .await;

        match result {
            Ok(count) => {
                tracing::info!(client = %self.client_key, count, "cloud upload finished");
                Ok(count)
            }
            Err(err) => {
                self.notify_error("Cloud sync", &err);
                Err(err)
            }
        }
    }

    /// Merge cloud entries into this pair's partition (additive, cloud wins
    /// on collisions). Returns the number of entries applied.
    pub async fn cloud_download<C: CloudStore>(
        &self,
        policy: &TierPolicy,
        encryption_key: Option<&str>,
        cloud: &C,
    ) -> Result<u32, String> {
        let _guard = acquire(&self.syncing, "cloud sync")?;
        ensure_cloud_access(policy, encryption_key)?;

        let result: Result<u32, String> = async {
            let entries = cloud.list().await?;
            let mut source = ServerPartition::new();
            for entry in &entries {
                if entry.disabled {
                    source.insert_disabled(entry.name.clone(), entry.config.clone());
                } else {
                    source.insert_active(entry.name.clone(), entry.config.clone());
                }
            }

            let mut partition = self.load()?;
            partition.merge_from(&source);
            self.persist(&partition)?;
            Ok(entries.len() as u32)
        }
        .await;

        match result {
            Ok(count) => {
                tracing::info!(client = %self.client_key, count, "cloud download finished");
                Ok(count)
            }
            Err(err) => {
                self.notify_error("Cloud sync", &err);
                Err(err)
            }
        }
    }
}
