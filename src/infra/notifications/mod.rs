// Moderator notification delivery.

pub mod log_notifier;
pub mod smtp_notifier;

pub use log_notifier::LogNotifier;
pub use smtp_notifier::{SmtpNotifier, SmtpSettings};

use crate::core::moderation::{FlagNotice, Notifier, NotifyError};
use async_trait::async_trait;

/// The notifier picked at startup.
pub enum ModeratorNotifier {
    Log(LogNotifier),
    Smtp(SmtpNotifier),
}

impl ModeratorNotifier {
    /// Email when SMTP settings are present, log-only otherwise.
    pub fn from_settings(smtp: Option<&SmtpSettings>) -> Result<Self, NotifyError> {
        match smtp {
            Some(settings) => Ok(Self::Smtp(SmtpNotifier::new(settings)?)),
            None => {
                tracing::warn!("SMTP host not configured; moderator notices will only be logged");
                Ok(Self::Log(LogNotifier))
            }
        }
    }
}

#[async_trait]
impl Notifier for ModeratorNotifier {
    async fn notify(&self, notice: &FlagNotice) -> Result<(), NotifyError> {
        match self {
            ModeratorNotifier::Log(inner) => inner.notify(notice).await,
            ModeratorNotifier::Smtp(inner) => inner.notify(notice).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::PostId;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = ModeratorNotifier::from_settings(None).unwrap();
        assert!(matches!(notifier, ModeratorNotifier::Log(_)));

        let notice = FlagNotice {
            post_id: PostId(1),
            title: "t".to_string(),
            content: "c".to_string(),
            reason: None,
        };
        assert!(notifier.notify(&notice).await.is_ok());
    }
}
