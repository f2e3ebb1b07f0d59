use anyhow::Result;

use super::{NotificationBatch, Notifier};
use crate::ingest::preview;

/// Writes the batch to the log. Used when no delivery channel is configured.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, batch: &NotificationBatch) -> Result<()> {
        tracing::info!(
            target: "notify",
            count = batch.count,
            at = %batch.generated_at.to_rfc3339(),
            "new posts"
        );
        for (i, p) in batch.posts.iter().enumerate() {
            tracing::info!(
                target: "notify",
                n = i + 1,
                date = %p.published_or_unknown(),
                text = %preview(&p.content),
                "post"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
