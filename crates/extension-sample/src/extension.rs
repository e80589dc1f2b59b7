//! Sample extension — wires settings, hooks, routes, UI, and messengers.

use std::path::Path;
use std::sync::Arc;

use gallery_extension_sdk::prelude::*;
use tokio::io::AsyncWriteExt;

use crate::hooks::{KeywordTagger, normalize_query};
use crate::messenger::LogMessenger;
use crate::settings::SampleSettings;

/// The sample extension.
#[derive(Debug, Default)]
pub struct SampleExtension;

impl SampleExtension {
    /// Creates the extension.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Extension for SampleExtension {
    async fn init(&self, ctx: &ExtensionContext) -> AppResult<()> {
        let settings: SampleSettings = ctx.config.set_template().await?;

        let tagger = Arc::new(KeywordTagger::new(&settings.keyword));
        ctx.events
            .after(HookPoint::LoadPhotoMetadata, move |data| {
                let tagger = tagger.clone();
                async move { tagger.tag(data) }
            })
            .await;
        ctx.events
            .before(HookPoint::Search, |input| async move { normalize_query(input) })
            .await;

        let extension_id = ctx.extension_id.clone();
        ctx.routes
            .get("ping", None, move |_req| {
                let extension_id = extension_id.clone();
                async move { Ok(json!({ "pong": true, "extension": extension_id })) }
            })
            .await?;

        let greeting = settings.greeting.clone();
        ctx.routes
            .post("greet", Some(UserRole::User), move |req: RouteRequest| {
                let greeting = greeting.clone();
                async move {
                    let name = required_str(&req.body, "name")?;
                    Ok(json!({ "message": format!("{greeting}, {name}!") }))
                }
            })
            .await?;

        let tag_log = ctx.data_dir.join(&settings.tag_log);
        let button = MediaButtonConfig {
            icon: Some("tag".to_string()),
            popup: Some(ButtonPopup {
                header: "Tag media".to_string(),
                fields: vec![PopupField {
                    id: "label".to_string(),
                    label: "Label".to_string(),
                    kind: "string".to_string(),
                    required: true,
                }],
            }),
            ..MediaButtonConfig::default()
        };
        ctx.ui
            .add_media_button("tag", button, move |req: MediaRequest| {
                let tag_log = tag_log.clone();
                async move { record_tag(&tag_log, &req).await }
            })
            .await?;

        ctx.messengers.add(Arc::new(LogMessenger)).await?;

        ctx.logger.info("Sample extension ready");
        Ok(())
    }

    async fn clean_up(&self, ctx: &ExtensionContext) -> AppResult<()> {
        ctx.logger.info("Sample extension stopped");
        Ok(())
    }
}

fn required_str<'a>(body: &'a Value, key: &str) -> AppResult<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(format!("'{key}' is required")))
}

/// Appends one JSON line per tag to the extension's data directory.
async fn record_tag(log: &Path, req: &MediaRequest) -> AppResult<Value> {
    let label = required_str(&req.body, "label")?;
    let media = req.media.path();

    let line = json!({
        "media": media,
        "label": label,
        "user": req.user.username,
        "at": chrono::Utc::now(),
    });
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;

    Ok(json!({ "media": media, "label": label }))
}

#[cfg(test)]
mod tests {
    use gallery_core::config::extension::ExtensionsConfig;
    use gallery_extension::store::{ExtensionConfigEntry, ExtensionConfigStore, JsonFileConfigStore};
    use gallery_extension::{BuiltinLoader, ExtensionManager};

    use super::*;

    async fn manager(root: &Path) -> (ExtensionManager, Arc<dyn ExtensionConfigStore>) {
        let folder = root.join("extensions").join("sample");
        tokio::fs::create_dir_all(&folder).await.expect("mkdir");
        tokio::fs::write(folder.join("entry"), b"").await.expect("entry");
        tokio::fs::write(folder.join("extension.toml"), "name = \"Sample\"\n")
            .await
            .expect("manifest");

        let store: Arc<dyn ExtensionConfigStore> = Arc::new(
            JsonFileConfigStore::open(root.join("extensions.json"))
                .await
                .expect("store"),
        );
        store
            .upsert(ExtensionConfigEntry {
                configs: json!({ "greeting": "Howdy" }),
                ..ExtensionConfigEntry::enabled("sample")
            })
            .await
            .expect("upsert");

        let config = ExtensionsConfig {
            folder: root.join("extensions").display().to_string(),
            data_directory: root.join("data").display().to_string(),
            scratch_directory: root.join("scratch").display().to_string(),
            entry_file: "entry".to_string(),
            ..ExtensionsConfig::default()
        };
        let loader = BuiltinLoader::new()
            .with("sample", || Arc::new(SampleExtension::new()) as Arc<dyn Extension>);
        (
            ExtensionManager::new(config, store.clone(), Arc::new(loader)),
            store,
        )
    }

    #[tokio::test]
    async fn test_init_registers_capabilities() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (manager, store) = manager(dir.path()).await;

        let outcome = manager.init_single("sample").await.expect("init");
        assert_eq!(outcome.unique_id(), Some("Sample"));

        let paths: Vec<String> = manager
            .routes()
            .list()
            .await
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert!(paths.contains(&"/extension/Sample/ping".to_string()));
        assert!(paths.contains(&"/extension/Sample/greet".to_string()));
        assert!(paths.contains(&"/extension/Sample/tag".to_string()));
        assert_eq!(manager.messengers().names().await, vec!["log".to_string()]);

        // Template defaults fill the gaps; the saved greeting survives.
        let saved = store.get("sample").await.expect("get").expect("entry");
        assert_eq!(saved.configs["greeting"], "Howdy");
        assert_eq!(saved.configs["keyword"], "sample");
    }

    #[tokio::test]
    async fn test_metadata_hook_adds_keyword() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (manager, _store) = manager(dir.path()).await;
        manager.init_single("sample").await.expect("init");

        let output: Value = manager
            .bus()
            .trigger(
                &HookPoint::LoadPhotoMetadata,
                json!({ "path": "trips/beach.jpg" }),
                |_input: Value| async move { Ok(json!({ "keywords": ["beach"] })) },
            )
            .await
            .expect("trigger");
        assert_eq!(output["keywords"], json!(["beach", "sample"]));

        manager.cleanup_all().await.expect("cleanup");
        let output: Value = manager
            .bus()
            .trigger(
                &HookPoint::LoadPhotoMetadata,
                json!({ "path": "trips/beach.jpg" }),
                |_input: Value| async move { Ok(json!({ "keywords": ["beach"] })) },
            )
            .await
            .expect("trigger");
        assert_eq!(output["keywords"], json!(["beach"]));
    }
}
