use crate::core::moderation::{FlagNotice, Notifier, NotifyError};
use async_trait::async_trait;

/// Notifier used when no mail server is configured: the review request only
/// goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &FlagNotice) -> Result<(), NotifyError> {
        tracing::warn!(
            post_id = notice.post_id.0,
            title = %notice.title,
            reason = notice.reason.as_deref().unwrap_or("-"),
            "Post review needed"
        );
        Ok(())
    }
}
