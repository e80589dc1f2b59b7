//! UI contributions — buttons extensions attach to media items.

use std::future::Future;
use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use gallery_core::AppResult;
use gallery_core::types::UserRole;

use crate::routes::binder::ExtensionRouter;
use crate::routes::handler::MediaRequest;

/// A form field shown in a button's popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupField {
    /// Key of the value in the submitted body.
    pub id: String,
    /// Label shown to the user.
    pub label: String,
    /// Input type, e.g. `string`, `number`, `boolean`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether a value is mandatory.
    #[serde(default)]
    pub required: bool,
}

/// Optional dialog shown before the button's operation is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonPopup {
    /// Dialog title.
    pub header: String,
    /// Fields collected from the user.
    #[serde(default)]
    pub fields: Vec<PopupField>,
}

/// How a media button is presented and who sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaButtonConfig {
    /// Icon name.
    pub icon: Option<String>,
    /// Popup shown before calling the operation.
    pub popup: Option<ButtonPopup>,
    /// Minimum role the button is shown to.
    pub minimum_role: UserRole,
    /// Do not invalidate the media directory's cache after the call.
    #[serde(default)]
    pub skip_directory_invalidation: bool,
}

impl Default for MediaButtonConfig {
    fn default() -> Self {
        Self {
            icon: None,
            popup: None,
            minimum_role: UserRole::User,
            skip_directory_invalidation: false,
        }
    }
}

/// A registered media button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaButton {
    /// Owning extension.
    pub extension_id: String,
    /// Button name; also its route path.
    pub name: String,
    /// Absolute path of the operation the button calls.
    pub api_path: String,
    /// Presentation settings.
    #[serde(flatten)]
    pub config: MediaButtonConfig,
}

/// Registry of UI contributions from all extensions.
#[derive(Debug, Default)]
pub struct UiRegistry {
    buttons: RwLock<Vec<MediaButton>>,
}

impl UiRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a button.
    pub async fn add(&self, button: MediaButton) {
        info!(
            extension_id = %button.extension_id,
            button = %button.name,
            "Media button registered"
        );
        self.buttons.write().await.push(button);
    }

    /// Buttons visible to `role`.
    pub async fn media_buttons_for(&self, role: UserRole) -> Vec<MediaButton> {
        self.buttons
            .read()
            .await
            .iter()
            .filter(|b| role.has_at_least(b.config.minimum_role))
            .cloned()
            .collect()
    }

    /// Removes every button owned by `owner`.
    pub async fn remove_owner(&self, owner: &str) -> usize {
        let mut buttons = self.buttons.write().await;
        let before = buttons.len();
        buttons.retain(|b| b.extension_id != owner);
        before - buttons.len()
    }

    /// Removes all buttons.
    pub async fn clear(&self) {
        self.buttons.write().await.clear();
    }
}

/// UI registration handle owned by one extension.
#[derive(Debug, Clone)]
pub struct ExtensionUi {
    extension_id: String,
    registry: Arc<UiRegistry>,
    router: ExtensionRouter,
}

impl ExtensionUi {
    /// Creates a handle for `extension_id`.
    pub fn new(
        extension_id: impl Into<String>,
        registry: Arc<UiRegistry>,
        router: ExtensionRouter,
    ) -> Self {
        Self {
            extension_id: extension_id.into(),
            registry,
            router,
        }
    }

    /// Adds a button to media items and binds its operation.
    ///
    /// The operation is a POST media route named after the button, guarded
    /// by the button's minimum role.
    pub async fn add_media_button<F, Fut, T>(
        &self,
        name: &str,
        config: MediaButtonConfig,
        handler: F,
    ) -> AppResult<MediaButton>
    where
        F: Fn(MediaRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let mut paths = self
            .router
            .register_media_operation(
                Method::POST,
                &[name],
                Some(config.minimum_role),
                !config.skip_directory_invalidation,
                handler,
            )
            .await?;

        let button = MediaButton {
            extension_id: self.extension_id.clone(),
            name: name.to_string(),
            api_path: paths.pop().unwrap_or_default(),
            config,
        };
        self.registry.add(button.clone()).await;
        Ok(button)
    }
}
