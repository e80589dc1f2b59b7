//! Dependency resolution for extensions that declare a dependency manifest.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{error, info};

use gallery_core::config::extension::DependencyConfig;

use super::error::InstallError;

/// Runs the configured package installer inside an extension folder.
#[derive(Debug, Clone)]
pub struct DependencyInstaller {
    config: DependencyConfig,
}

impl DependencyInstaller {
    /// Creates an installer from configuration.
    pub fn new(config: DependencyConfig) -> Self {
        Self { config }
    }

    /// Whether `folder` declares dependencies that are not yet resolved.
    pub async fn needs_install(&self, folder: &Path) -> bool {
        let manifest = tokio::fs::try_exists(folder.join(&self.config.manifest))
            .await
            .unwrap_or(false);
        let resolved = tokio::fs::try_exists(folder.join(&self.config.resolved_dir))
            .await
            .unwrap_or(false);
        manifest && !resolved
    }

    /// Runs the installer command in `folder` and waits for it.
    pub async fn install(&self, folder: &Path) -> Result<(), InstallError> {
        let Some((program, args)) = self.config.install_command.split_first() else {
            return Err(InstallError::InstallerNotStarted {
                command: String::new(),
                reason: "no installer command configured".into(),
            });
        };

        info!(
            folder = %folder.display(),
            command = %self.config.install_command.join(" "),
            timeout_s = self.config.timeout_seconds,
            "Installing extension dependencies"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(folder)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(InstallError::InstallerNotStarted {
                    command: program.clone(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                error!(
                    folder = %folder.display(),
                    timeout_s = self.config.timeout_seconds,
                    "Dependency installer timed out"
                );
                return Err(InstallError::DependencyTimeout {
                    timeout_seconds: self.config.timeout_seconds,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            error!(
                folder = %folder.display(),
                code,
                stderr = %stderr.chars().take(500).collect::<String>(),
                "Dependency installer failed"
            );
            return Err(InstallError::DependenciesFailed {
                code,
                stderr: stderr.chars().take(2000).collect(),
            });
        }

        info!(folder = %folder.display(), "Extension dependencies installed");
        Ok(())
    }
}
