//! A messenger that writes messages to the log.

use gallery_extension_sdk::prelude::*;
use tracing::info;

/// Delivers messages by logging them.
#[derive(Debug, Default)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &Message) -> AppResult<()> {
        info!(
            subject = %message.subject,
            recipients = ?message.recipients,
            "{}",
            message.body
        );
        Ok(())
    }
}
