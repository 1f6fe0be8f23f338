//! Usage: Local client-to-client config sync (override or additive merge).

use crate::infra::config_store::ConfigStore;
use crate::tier::{Tier, TierPolicy};

use super::coordinator::{acquire, McpCoordinator};
use super::types::SyncRequest;

impl<S: ConfigStore> McpCoordinator<S> {
    /// Copy one client's server partition into another's.
    ///
    /// `override_all` replaces the destination wholesale; otherwise source
    /// entries are merged in additively (collisions take the source's version
    /// and placement, destination-only entries stay). Either mode is
    /// idempotent for an unchanged source.
    ///
    /// Requires the Lifetime plan or higher; the denial is surfaced as a
    /// `TIER_UPGRADE_REQUIRED` error so the shell can raise its upgrade
    /// prompt, never as a silent no-op.
    pub fn sync_local(&self, policy: &TierPolicy, request: &SyncRequest) -> Result<(), String> {
        let _guard = acquire(&self.syncing, "local sync")?;

        if !policy.has_minimum_tier(Tier::Lifetime) {
            return Err(
                "TIER_UPGRADE_REQUIRED: local sync requires the Lifetime plan or higher"
                    .to_string(),
            );
        }

        let result = (|| {
            let source = self
                .store
                .load(&request.from_client, request.from_path.as_deref())?;

            let mut dest = self
                .store
                .load(&request.to_client, request.to_path.as_deref())?;

            if request.override_all {
                dest = source;
            } else {
                dest.merge_from(&source);
            }

            self.store
                .write(&request.to_client, request.to_path.as_deref(), &dest)
        })();

        match result {
            Ok(()) => {
                tracing::info!(
                    from = %request.from_client,
                    to = %request.to_client,
                    override_all = request.override_all,
                    "local sync finished"
                );
                Ok(())
            }
            Err(err) => {
                self.notify_error("Local sync", &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::coordinator::tests::{stdio, MemStore};
    use super::super::types::ServerPartition;
    use super::*;
    use crate::tier::UserRecord;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// Store with two independent slots keyed by client name.
    #[derive(Default)]
    struct TwoClientStore {
        slots: Mutex<BTreeMap<String, ServerPartition>>,
    }

    impl ConfigStore for TwoClientStore {
        fn load(&self, client_key: &str, _path: Option<&str>) -> Result<ServerPartition, String> {
            Ok(self
                .slots
                .lock()
                .expect("lock")
                .get(client_key)
                .cloned()
                .unwrap_or_default())
        }

        fn write(
            &self,
            client_key: &str,
            _path: Option<&str>,
            partition: &ServerPartition,
        ) -> Result<(), String> {
            self.slots
                .lock()
                .expect("lock")
                .insert(client_key.to_string(), partition.clone());
            Ok(())
        }
    }

    fn lifetime_policy() -> TierPolicy {
        TierPolicy::evaluate(
            &UserRecord {
                tier: Some("LIFETIME".to_string()),
                ..UserRecord::default()
            },
            0,
        )
    }

    fn free_policy() -> TierPolicy {
        TierPolicy::evaluate(&UserRecord::default(), 0)
    }

    fn request(override_all: bool) -> SyncRequest {
        SyncRequest {
            from_client: "claude".to_string(),
            from_path: None,
            to_client: "cursor".to_string(),
            to_path: None,
            override_all,
        }
    }

    fn seeded_store() -> Arc<TwoClientStore> {
        let store = Arc::new(TwoClientStore::default());
        let mut source = ServerPartition::new();
        source.insert_active("fetch", stdio("uvx"));
        source.insert_disabled("fs", stdio("npx"));
        let mut dest = ServerPartition::new();
        dest.insert_active("dest-only", stdio("deno"));
        dest.insert_active("fs", stdio("dest-version"));
        {
            let mut slots = store.slots.lock().expect("lock");
            slots.insert("claude".to_string(), source);
            slots.insert("cursor".to_string(), dest);
        }
        store
    }

    #[test]
    fn sync_requires_lifetime_tier() {
        let store = seeded_store();
        let coordinator = McpCoordinator::new(store.clone(), "claude", None).expect("coordinator");

        let err = coordinator
            .sync_local(&free_policy(), &request(false))
            .unwrap_err();
        assert!(err.starts_with("TIER_UPGRADE_REQUIRED:"), "{err}");

        // Denied sync must not have touched the destination.
        let dest = store.load("cursor", None).expect("load");
        assert!(dest.active().contains_key("dest-only"));
        assert_eq!(dest.active().get("fs"), Some(&stdio("dest-version")));
    }

    #[test]
    fn merge_mode_is_additive_source_wins_and_idempotent() {
        let store = seeded_store();
        let coordinator = McpCoordinator::new(store.clone(), "claude", None).expect("coordinator");
        let policy = lifetime_policy();

        coordinator
            .sync_local(&policy, &request(false))
            .expect("sync");
        let once = store.load("cursor", None).expect("load");

        assert!(once.active().contains_key("dest-only"));
        assert!(once.active().contains_key("fetch"));
        // Collision takes the source's payload and its disabled placement.
        assert_eq!(once.disabled().get("fs"), Some(&stdio("npx")));
        assert!(!once.active().contains_key("fs"));

        coordinator
            .sync_local(&policy, &request(false))
            .expect("sync twice");
        assert_eq!(store.load("cursor", None).expect("load"), once);
    }

    #[test]
    fn override_mode_replaces_destination_wholesale() {
        let store = seeded_store();
        let coordinator = McpCoordinator::new(store.clone(), "claude", None).expect("coordinator");

        coordinator
            .sync_local(&lifetime_policy(), &request(true))
            .expect("sync");

        let dest = store.load("cursor", None).expect("load");
        assert!(!dest.contains("dest-only"));
        assert!(dest.active().contains_key("fetch"));
        assert_eq!(dest.disabled().get("fs"), Some(&stdio("npx")));
        assert_eq!(dest, store.load("claude", None).expect("load"));
    }

    #[test]
    fn missing_destination_file_starts_empty() {
        let store = Arc::new(TwoClientStore::default());
        let mut source = ServerPartition::new();
        source.insert_active("fetch", stdio("uvx"));
        store
            .slots
            .lock()
            .expect("lock")
            .insert("claude".to_string(), source);

        let coordinator = McpCoordinator::new(store.clone(), "claude", None).expect("coordinator");
        coordinator
            .sync_local(&lifetime_policy(), &request(false))
            .expect("sync");

        let dest = store.load("cursor", None).expect("load");
        assert!(dest.active().contains_key("fetch"));
    }

    #[test]
    fn reentrant_sync_is_rejected_while_busy() {
        let store = MemStore::seeded(ServerPartition::new());
        let coordinator = McpCoordinator::new(store, "claude", None).expect("coordinator");

        let _guard = acquire(&coordinator.syncing, "local sync").expect("acquire");
        let err = coordinator
            .sync_local(&lifetime_policy(), &request(false))
            .unwrap_err();
        assert_eq!(err, "SYNC_BUSY: local sync is already running");
    }
}
