//! Per-extension handles for hooks, settings, and logging.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use gallery_core::{AppError, AppResult};

use crate::hooks::definitions::{AfterData, BeforeOutcome, HookPoint};
use crate::hooks::registry::{ClosureAfterHandler, ClosureBeforeHandler, HookRegistry};
use crate::store::{ExtensionConfigEntry, ExtensionConfigStore};

/// Hook registration handle owned by one extension.
#[derive(Debug, Clone)]
pub struct ExtensionEvents {
    extension_id: String,
    hooks: Arc<HookRegistry>,
}

impl ExtensionEvents {
    /// Creates a handle registering hooks on behalf of `extension_id`.
    pub fn new(extension_id: impl Into<String>, hooks: Arc<HookRegistry>) -> Self {
        Self {
            extension_id: extension_id.into(),
            hooks,
        }
    }

    /// Adds a before-handler to `hook`; returns its sequence number.
    pub async fn before<F, Fut>(&self, hook: HookPoint, handler: F) -> u64
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<BeforeOutcome>> + Send + 'static,
    {
        self.hooks
            .register_before(
                hook,
                &self.extension_id,
                Arc::new(ClosureBeforeHandler::new(handler)),
            )
            .await
    }

    /// Adds an after-handler to `hook`; returns its sequence number.
    pub async fn after<F, Fut>(&self, hook: HookPoint, handler: F) -> u64
    where
        F: Fn(AfterData) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Value>> + Send + 'static,
    {
        self.hooks
            .register_after(
                hook,
                &self.extension_id,
                Arc::new(ClosureAfterHandler::new(handler)),
            )
            .await
    }
}

/// Access to the extension's persisted settings.
#[derive(Debug, Clone)]
pub struct ExtensionConfigHandle {
    folder_name: String,
    store: Arc<dyn ExtensionConfigStore>,
}

impl ExtensionConfigHandle {
    /// Creates a handle for the entry of `folder_name`.
    pub fn new(folder_name: impl Into<String>, store: Arc<dyn ExtensionConfigStore>) -> Self {
        Self {
            folder_name: folder_name.into(),
            store,
        }
    }

    /// Current settings; `Null` when none were saved.
    pub async fn get(&self) -> AppResult<Value> {
        Ok(self.entry().await?.configs)
    }

    /// Current settings deserialized into `T`.
    pub async fn get_typed<T: DeserializeOwned>(&self) -> AppResult<T> {
        let value = self.get().await?;
        serde_json::from_value(value).map_err(|e| {
            AppError::with_source(
                gallery_core::error::ErrorKind::Configuration,
                format!("Settings of '{}' do not match their schema", self.folder_name),
                e,
            )
        })
    }

    /// Replaces the settings and persists them.
    pub async fn set(&self, configs: Value) -> AppResult<()> {
        self.write(configs).await?;

        debug!(folder = %self.folder_name, "Extension settings saved");
        Ok(())
    }

    /// Declares the settings template.
    ///
    /// Keys missing from the saved settings are filled from `T::default()`;
    /// saved values win. The merged settings are persisted and returned.
    pub async fn set_template<T>(&self) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let defaults = serde_json::to_value(T::default())?;
        let saved = self.entry().await?.configs;
        let merged = merge_defaults(defaults, saved.clone());

        let typed: T = serde_json::from_value(merged.clone()).map_err(|e| {
            AppError::with_source(
                gallery_core::error::ErrorKind::Configuration,
                format!("Settings of '{}' do not match their template", self.folder_name),
                e,
            )
        })?;

        if merged != saved {
            self.write(merged).await?;
        }
        Ok(typed)
    }

    /// Replaces the settings of the existing entry only; enablement is left
    /// to the lifecycle manager.
    async fn write(&self, configs: Value) -> AppResult<()> {
        if self.store.update_configs(&self.folder_name, configs).await? {
            Ok(())
        } else {
            Err(self.missing_entry())
        }
    }

    fn missing_entry(&self) -> AppError {
        AppError::not_found(format!(
            "No configuration entry for extension '{}'",
            self.folder_name
        ))
    }

    async fn entry(&self) -> AppResult<ExtensionConfigEntry> {
        self.store
            .get(&self.folder_name)
            .await?
            .ok_or_else(|| self.missing_entry())
    }
}

/// Fills keys of `saved` that are missing, recursively, from `defaults`.
fn merge_defaults(defaults: Value, saved: Value) -> Value {
    match (defaults, saved) {
        (defaults, Value::Null) => defaults,
        (Value::Object(defaults), Value::Object(mut saved)) => {
            for (key, default) in defaults {
                let current = saved.remove(&key).unwrap_or(Value::Null);
                saved.insert(key, merge_defaults(default, current));
            }
            Value::Object(saved)
        }
        (_, saved) => saved,
    }
}

/// Logger that tags every record with the extension's id.
#[derive(Debug, Clone)]
pub struct ExtensionLogger {
    extension_id: String,
}

impl ExtensionLogger {
    /// Creates a logger for `extension_id`.
    pub fn new(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
        }
    }

    /// Debug-level record.
    pub fn debug(&self, message: &str) {
        debug!(target: "extension", extension_id = %self.extension_id, "{message}");
    }

    /// Info-level record.
    pub fn info(&self, message: &str) {
        info!(target: "extension", extension_id = %self.extension_id, "{message}");
    }

    /// Warn-level record.
    pub fn warn(&self, message: &str) {
        warn!(target: "extension", extension_id = %self.extension_id, "{message}");
    }

    /// Error-level record.
    pub fn error(&self, message: &str) {
        error!(target: "extension", extension_id = %self.extension_id, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::store::JsonFileConfigStore;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Settings {
        greeting: String,
        repeat: u32,
    }

    async fn handle(configs: Value) -> (ExtensionConfigHandle, Arc<dyn ExtensionConfigStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: Arc<dyn ExtensionConfigStore> = Arc::new(
            JsonFileConfigStore::open(dir.path().join("extensions.json"))
                .await
                .expect("open"),
        );
        store
            .upsert(ExtensionConfigEntry {
                path: "sample".into(),
                enabled: true,
                configs,
            })
            .await
            .expect("upsert");
        (ExtensionConfigHandle::new("sample", store.clone()), store, dir)
    }

    #[tokio::test]
    async fn test_template_fills_missing_keys() {
        let (config, store, _dir) = handle(json!({ "greeting": "hej" })).await;

        let settings: Settings = config.set_template().await.expect("template");
        assert_eq!(
            settings,
            Settings {
                greeting: "hej".into(),
                repeat: 0
            }
        );

        let saved = store.get("sample").await.expect("get").expect("entry");
        assert_eq!(saved.configs, json!({ "greeting": "hej", "repeat": 0 }));
        assert!(saved.enabled);
    }

    #[tokio::test]
    async fn test_set_and_get_typed() {
        let (config, _store, _dir) = handle(Value::Null).await;
        config
            .set(json!({ "greeting": "hello", "repeat": 2 }))
            .await
            .expect("set");

        let settings: Settings = config.get_typed().await.expect("typed");
        assert_eq!(settings.repeat, 2);
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let (_config, store, _dir) = handle(Value::Null).await;
        let other = ExtensionConfigHandle::new("other", store);
        let err = other.get().await.expect_err("missing");
        assert_eq!(err.kind, gallery_core::error::ErrorKind::NotFound);
    }

    /// Store that parks every `get` until released, so another writer can
    /// run between a settings read and its write.
    #[derive(Debug)]
    struct PausingStore {
        inner: Arc<dyn ExtensionConfigStore>,
        reached: Arc<tokio::sync::Notify>,
        resume: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl ExtensionConfigStore for PausingStore {
        async fn list(&self) -> AppResult<Vec<ExtensionConfigEntry>> {
            self.inner.list().await
        }

        async fn get(&self, folder_name: &str) -> AppResult<Option<ExtensionConfigEntry>> {
            self.reached.notify_one();
            self.resume.notified().await;
            self.inner.get(folder_name).await
        }

        async fn upsert(&self, entry: ExtensionConfigEntry) -> AppResult<()> {
            self.inner.upsert(entry).await
        }

        async fn remove(&self, folder_name: &str) -> AppResult<bool> {
            self.inner.remove(folder_name).await
        }

        async fn update_configs(&self, folder_name: &str, configs: Value) -> AppResult<bool> {
            self.inner.update_configs(folder_name, configs).await
        }
    }

    async fn paused_template_write(
        store: Arc<dyn ExtensionConfigStore>,
        between: impl Future<Output = ()>,
    ) -> AppResult<Settings> {
        let reached = Arc::new(tokio::sync::Notify::new());
        let resume = Arc::new(tokio::sync::Notify::new());
        let paused: Arc<dyn ExtensionConfigStore> = Arc::new(PausingStore {
            inner: store,
            reached: reached.clone(),
            resume: resume.clone(),
        });
        let config = ExtensionConfigHandle::new("sample", paused);

        let write = tokio::spawn(async move { config.set_template::<Settings>().await });
        reached.notified().await;
        between.await;
        resume.notify_one();
        write.await.expect("join")
    }

    #[tokio::test]
    async fn test_settings_write_does_not_resurrect_deleted_entry() {
        let (_config, store, _dir) = handle(Value::Null).await;

        let remover = store.clone();
        let result = paused_template_write(store.clone(), async move {
            assert!(remover.remove("sample").await.expect("remove"));
        })
        .await;

        let err = result.expect_err("entry is gone");
        assert_eq!(err.kind, gallery_core::error::ErrorKind::NotFound);
        assert!(store.get("sample").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_settings_write_keeps_concurrent_disable() {
        let (_config, store, _dir) = handle(json!({ "greeting": "hej" })).await;

        let toggler = store.clone();
        paused_template_write(store.clone(), async move {
            toggler
                .upsert(ExtensionConfigEntry {
                    path: "sample".into(),
                    enabled: false,
                    configs: json!({ "greeting": "hej" }),
                })
                .await
                .expect("disable");
        })
        .await
        .expect("template");

        let entry = store.get("sample").await.expect("get").expect("entry");
        assert!(!entry.enabled);
        assert_eq!(entry.configs, json!({ "greeting": "hej", "repeat": 0 }));
    }

    #[tokio::test]
    async fn test_set_on_removed_entry_is_not_found() {
        let (config, store, _dir) = handle(Value::Null).await;
        store.remove("sample").await.expect("remove");

        let err = config.set(json!({ "k": 1 })).await.expect_err("gone");
        assert_eq!(err.kind, gallery_core::error::ErrorKind::NotFound);
        assert!(store.get("sample").await.expect("get").is_none());
    }

    #[test]
    fn test_merge_keeps_saved_values() {
        let merged = merge_defaults(
            json!({ "a": 1, "nested": { "x": true, "y": "d" } }),
            json!({ "nested": { "y": "saved" }, "extra": 5 }),
        );
        assert_eq!(
            merged,
            json!({ "a": 1, "nested": { "x": true, "y": "saved" }, "extra": 5 })
        );
    }

    #[tokio::test]
    async fn test_events_register_under_owner() {
        let hooks = Arc::new(HookRegistry::new());
        let events = ExtensionEvents::new("Sample", hooks.clone());
        events
            .before(HookPoint::Search, |input| async move {
                Ok(BeforeOutcome::Continue(input))
            })
            .await;
        events
            .after(HookPoint::Search, |data: AfterData| async move { Ok(data.output) })
            .await;

        assert_eq!(hooks.unregister_owner("Sample").await, 2);
    }
}
