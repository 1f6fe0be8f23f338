//! Usage: Per-(client, path) coordinator over the active/disabled server maps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::clients;
use crate::infra::config_store::ConfigStore;
use crate::notice::{self, NoticeLevel, NoticeSink, TracingNoticeSink};

use super::batch::{BatchReport, RowSelection};
use super::types::{ServerConfig, ServerPartition};
use super::validate::{validate_server_config, validate_server_name};

/// Clears the busy flag when the operation leaves scope, error paths included.
pub(super) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub(super) fn acquire<'a>(flag: &'a AtomicBool, what: &str) -> Result<BusyGuard<'a>, String> {
    if flag.swap(true, Ordering::SeqCst) {
        return Err(format!("SYNC_BUSY: {what} is already running"));
    }
    Ok(BusyGuard(flag))
}

/// Owns the server maps of exactly one (client, path) pair. Coordinators for
/// different pairs are independent; nothing else may write these maps.
pub struct McpCoordinator<S: ConfigStore> {
    pub(super) store: S,
    pub(super) client_key: String,
    pub(super) path: Option<String>,
    pub(super) syncing: AtomicBool,
    pub(super) deleting: AtomicBool,
    pub(super) notices: Arc<dyn NoticeSink>,
}

impl<S: ConfigStore> McpCoordinator<S> {
    pub fn new(store: S, client_key: &str, path: Option<&str>) -> Result<Self, String> {
        clients::validate_client_key(client_key)?;
        let path = path.map(str::trim).filter(|p| !p.is_empty());
        if client_key == clients::CUSTOM_CLIENT_KEY && path.is_none() {
            return Err("SEC_INVALID_INPUT: path is required for custom client".to_string());
        }

        Ok(McpCoordinator {
            store,
            client_key: client_key.to_string(),
            path: path.map(str::to_string),
            syncing: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
            notices: Arc::new(TracingNoticeSink),
        })
    }

    pub fn with_notice_sink(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst)
    }

    pub fn load(&self) -> Result<ServerPartition, String> {
        self.store.load(&self.client_key, self.path.as_deref())
    }

    pub(super) fn persist(&self, partition: &ServerPartition) -> Result<(), String> {
        self.store
            .write(&self.client_key, self.path.as_deref(), partition)
    }

    pub(super) fn notify_error(&self, title: &str, err: &str) {
        tracing::error!(client = %self.client_key, "{title} failed: {err}");
        self.notices.emit(notice::build(
            NoticeLevel::Error,
            Some(title.to_string()),
            err.to_string(),
        ));
    }

    /// Move `name` from disabled to active. Missing names are a no-op
    /// (`Ok(false)`), not an error.
    pub fn enable_server(&self, name: &str) -> Result<bool, String> {
        let result = (|| {
            let mut partition = self.load()?;
            if !partition.enable(name) {
                tracing::debug!(client = %self.client_key, server = %name, "enable skipped: not disabled");
                return Ok(false);
            }
            self.persist(&partition)?;
            Ok(true)
        })();

        result.map_err(|err: String| {
            self.notify_error("Enable server", &err);
            err
        })
    }

    /// Move `name` from active to disabled. Missing names are a no-op.
    pub fn disable_server(&self, name: &str) -> Result<bool, String> {
        let result = (|| {
            let mut partition = self.load()?;
            if !partition.disable(name) {
                tracing::debug!(client = %self.client_key, server = %name, "disable skipped: not active");
                return Ok(false);
            }
            self.persist(&partition)?;
            Ok(true)
        })();

        result.map_err(|err: String| {
            self.notify_error("Disable server", &err);
            err
        })
    }

    /// Add or overwrite `name` in the targeted map. Errors are logged and
    /// re-raised so composed flows (save, then record a download) can halt.
    pub fn update_server(
        &self,
        name: &str,
        config: ServerConfig,
        disabled: bool,
    ) -> Result<(), String> {
        validate_server_name(name)?;
        validate_server_config(&config)?;

        let result = (|| {
            let mut partition = self.load()?;
            if disabled {
                partition.insert_disabled(name.trim(), config);
            } else {
                partition.insert_active(name.trim(), config);
            }
            self.persist(&partition)
        })();

        result.map_err(|err| {
            tracing::error!(client = %self.client_key, server = %name, "update server failed: {err}");
            err
        })
    }

    /// Remove `name` from whichever map holds it. Missing names are a no-op.
    pub fn remove_server(&self, name: &str) -> Result<bool, String> {
        let result = (|| {
            let mut partition = self.load()?;
            if !partition.remove(name) {
                return Ok(false);
            }
            self.persist(&partition)?;
            Ok(true)
        })();

        result.map_err(|err: String| {
            self.notify_error("Remove server", &err);
            err
        })
    }

    /// Enable every selected server, in selection order. One item's failure
    /// never aborts the rest; the selection is cleared unconditionally once
    /// the batch has run.
    pub fn batch_enable(&self, selection: &mut RowSelection) -> Result<BatchReport, String> {
        self.run_toggle_batch(selection, true)
    }

    /// Disable every selected server; same failure policy as [`Self::batch_enable`].
    pub fn batch_disable(&self, selection: &mut RowSelection) -> Result<BatchReport, String> {
        self.run_toggle_batch(selection, false)
    }

    fn run_toggle_batch(
        &self,
        selection: &mut RowSelection,
        enable: bool,
    ) -> Result<BatchReport, String> {
        if selection.is_empty() {
            return Err("SEC_INVALID_INPUT: no server selected".to_string());
        }

        let mut report = BatchReport::default();
        for name in selection.names() {
            let attempt = if enable {
                self.enable_server(name)
            } else {
                self.disable_server(name)
            };
            match attempt {
                Ok(true) => report.succeeded.push(name.clone()),
                Ok(false) => report.skipped.push(name.clone()),
                Err(err) => report.failed.push((name.clone(), err)),
            }
        }

        selection.clear();
        Ok(report)
    }

    /// Delete every selected server, all-or-nothing: one load, one write. Any
    /// error (unknown name included) aborts the whole batch and leaves the
    /// selection in place for a retry.
    pub fn batch_delete(&self, selection: &mut RowSelection) -> Result<u32, String> {
        let _guard = acquire(&self.deleting, "batch delete")?;

        if selection.is_empty() {
            return Err("SEC_INVALID_INPUT: no server selected".to_string());
        }

        let result = (|| {
            let mut partition = self.load()?;
            for name in selection.names() {
                if !partition.remove(name) {
                    return Err(format!("CONFIG_NOT_FOUND: server '{name}' not found"));
                }
            }
            self.persist(&partition)?;
            Ok(selection.len() as u32)
        })();

        match result {
            Ok(count) => {
                selection.clear();
                Ok(count)
            }
            Err(err) => {
                self.notify_error("Delete servers", &err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::mcp::BatchOutcome;
    use std::sync::Mutex;

    /// In-memory store with targeted write-failure injection: a write is
    /// rejected while `poison` names an entry present in the active map.
    #[derive(Default)]
    pub(in crate::domain::mcp) struct MemStore {
        pub partition: Mutex<ServerPartition>,
        pub poison_active: Mutex<Option<String>>,
        pub fail_all_writes: Mutex<bool>,
    }

    impl MemStore {
        pub fn seeded(partition: ServerPartition) -> Arc<Self> {
            Arc::new(MemStore {
                partition: Mutex::new(partition),
                ..MemStore::default()
            })
        }

        pub fn snapshot(&self) -> ServerPartition {
            self.partition.lock().expect("lock").clone()
        }
    }

    impl ConfigStore for MemStore {
        fn load(&self, _client_key: &str, _path: Option<&str>) -> Result<ServerPartition, String> {
            Ok(self.snapshot())
        }

        fn write(
            &self,
            _client_key: &str,
            _path: Option<&str>,
            partition: &ServerPartition,
        ) -> Result<(), String> {
            if *self.fail_all_writes.lock().expect("lock") {
                return Err("CONFIG_IO: injected write failure".to_string());
            }
            if let Some(poison) = self.poison_active.lock().expect("lock").as_deref() {
                if partition.active().contains_key(poison) {
                    return Err(format!("CONFIG_IO: injected write failure for {poison}"));
                }
            }
            *self.partition.lock().expect("lock") = partition.clone();
            Ok(())
        }
    }

    pub(in crate::domain::mcp) fn stdio(cmd: &str) -> ServerConfig {
        ServerConfig::stdio(cmd, vec![])
    }

    fn coordinator(store: Arc<MemStore>) -> McpCoordinator<Arc<MemStore>> {
        McpCoordinator::new(store, "claude", None).expect("coordinator")
    }

    #[test]
    fn custom_client_requires_path() {
        let store = MemStore::seeded(ServerPartition::new());
        let err = McpCoordinator::new(store.clone(), "custom", None).err().expect("err");
        assert_eq!(err, "SEC_INVALID_INPUT: path is required for custom client");
        assert!(McpCoordinator::new(store, "custom", Some("/tmp/x.json")).is_ok());
    }

    #[test]
    fn unknown_client_is_rejected() {
        let store = MemStore::seeded(ServerPartition::new());
        assert!(McpCoordinator::new(store, "emacs", None).is_err());
    }

    #[test]
    fn enable_disable_round_trip_is_exact() {
        let mut partition = ServerPartition::new();
        let original = stdio("uvx");
        partition.insert_active("fetch", original.clone());
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store.clone());

        assert!(coordinator.disable_server("fetch").expect("disable"));
        assert!(coordinator.enable_server("fetch").expect("enable"));

        let end = store.snapshot();
        assert_eq!(end.active().get("fetch"), Some(&original));
        assert!(end.disabled().is_empty());
    }

    #[test]
    fn enable_of_unknown_name_is_noop() {
        let mut partition = ServerPartition::new();
        partition.insert_active("a", stdio("a"));
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store.clone());

        let before = store.snapshot();
        assert!(!coordinator.enable_server("ghost").expect("enable"));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn update_server_overwrites_and_keeps_maps_disjoint() {
        let mut partition = ServerPartition::new();
        partition.insert_disabled("dup", stdio("old"));
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store.clone());

        coordinator
            .update_server("dup", stdio("new"), false)
            .expect("update");

        let end = store.snapshot();
        assert_eq!(end.active().get("dup"), Some(&stdio("new")));
        assert!(end.disabled().is_empty());
    }

    #[test]
    fn update_server_rejects_invalid_config() {
        let store = MemStore::seeded(ServerPartition::new());
        let coordinator = coordinator(store);
        let err = coordinator
            .update_server("x", stdio(" "), false)
            .unwrap_err();
        assert!(err.starts_with("SEC_INVALID_INPUT:"), "{err}");
    }

    #[test]
    fn update_server_reraises_write_errors() {
        let store = MemStore::seeded(ServerPartition::new());
        *store.fail_all_writes.lock().expect("lock") = true;
        let coordinator = coordinator(store);
        let err = coordinator
            .update_server("x", stdio("npx"), false)
            .unwrap_err();
        assert!(err.starts_with("CONFIG_IO:"), "{err}");
    }

    #[test]
    fn batch_enable_continues_past_failures_and_clears_selection() {
        let mut partition = ServerPartition::new();
        partition.insert_disabled("a", stdio("a"));
        partition.insert_disabled("b", stdio("b"));
        partition.insert_disabled("c", stdio("c"));
        let store = MemStore::seeded(partition);
        *store.poison_active.lock().expect("lock") = Some("b".to_string());
        let coordinator = coordinator(store.clone());

        let mut selection =
            RowSelection::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let report = coordinator.batch_enable(&mut selection).expect("batch");

        assert_eq!(report.outcome(), BatchOutcome::PartiallyFailed);
        assert_eq!(report.succeeded, ["a".to_string(), "c".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(selection.is_empty(), "selection cleared even on partial failure");

        let end = store.snapshot();
        assert!(end.active().contains_key("a"));
        assert!(end.active().contains_key("c"));
        assert!(end.disabled().contains_key("b"));
    }

    #[test]
    fn batch_enable_skips_already_active_names() {
        let mut partition = ServerPartition::new();
        partition.insert_active("a", stdio("a"));
        partition.insert_disabled("b", stdio("b"));
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store);

        let mut selection = RowSelection::from(vec!["a".to_string(), "b".to_string()]);
        let report = coordinator.batch_enable(&mut selection).expect("batch");

        assert_eq!(report.outcome(), BatchOutcome::Completed);
        assert_eq!(report.skipped, ["a".to_string()]);
        assert_eq!(report.succeeded, ["b".to_string()]);
    }

    #[test]
    fn batch_enable_rejects_empty_selection() {
        let store = MemStore::seeded(ServerPartition::new());
        let coordinator = coordinator(store);
        let mut selection = RowSelection::new();
        assert_eq!(
            coordinator.batch_enable(&mut selection).unwrap_err(),
            "SEC_INVALID_INPUT: no server selected"
        );
    }

    #[test]
    fn batch_delete_is_all_or_nothing_and_keeps_selection_on_error() {
        let mut partition = ServerPartition::new();
        partition.insert_active("a", stdio("a"));
        partition.insert_disabled("c", stdio("c"));
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store.clone());

        // "b" does not exist: the whole batch must abort.
        let mut selection =
            RowSelection::from(vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        let err = coordinator.batch_delete(&mut selection).unwrap_err();
        assert!(err.starts_with("CONFIG_NOT_FOUND:"), "{err}");
        assert_eq!(selection.len(), 3, "selection kept for retry");

        let end = store.snapshot();
        assert!(end.active().contains_key("a"));
        assert!(end.disabled().contains_key("c"));
    }

    #[test]
    fn batch_delete_write_failure_removes_nothing() {
        let mut partition = ServerPartition::new();
        partition.insert_active("a", stdio("a"));
        partition.insert_active("b", stdio("b"));
        let store = MemStore::seeded(partition);
        *store.fail_all_writes.lock().expect("lock") = true;
        let coordinator = coordinator(store.clone());

        let mut selection = RowSelection::from(vec!["a".to_string(), "b".to_string()]);
        assert!(coordinator.batch_delete(&mut selection).is_err());
        assert_eq!(selection.len(), 2);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn batch_delete_success_clears_selection() {
        let mut partition = ServerPartition::new();
        partition.insert_active("a", stdio("a"));
        partition.insert_disabled("b", stdio("b"));
        let store = MemStore::seeded(partition);
        let coordinator = coordinator(store.clone());

        let mut selection = RowSelection::from(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(coordinator.batch_delete(&mut selection).expect("delete"), 2);
        assert!(selection.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
