// Email notifier - tells the moderator inbox about flagged posts over SMTP.

use crate::core::moderation::{FlagNotice, Notifier, NotifyError};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

pub const REVIEW_SUBJECT: &str = "Post Review Needed";

/// SMTP connection and addressing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_starttls: bool,
    pub from: String,
    pub moderator: String,
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    moderator: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let (from, moderator) = parse_addresses(settings)?;

        let builder = if settings.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        }
        .map_err(|e| NotifyError::ConfigError(format!("Failed to configure SMTP transport: {}", e)))?
        .port(settings.port);

        let builder = if let (Some(username), Some(password)) =
            (&settings.username, &settings.password)
        {
            builder.credentials(Credentials::new(username.to_string(), password.to_string()))
        } else {
            builder
        };

        Ok(Self {
            transport: builder.build(),
            from,
            moderator,
        })
    }
}

fn parse_addresses(settings: &SmtpSettings) -> Result<(Mailbox, Mailbox), NotifyError> {
    let from = settings
        .from
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::ConfigError(format!("Invalid from address: {}", e)))?;
    let moderator = settings
        .moderator
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::ConfigError(format!("Invalid moderator address: {}", e)))?;
    Ok((from, moderator))
}

/// Plain-text body of the review request.
pub fn compose_body(notice: &FlagNotice) -> String {
    let mut body = format!(
        "A post with ID {} has been flagged for review. Title: {}",
        notice.post_id, notice.title
    );
    if let Some(reason) = &notice.reason {
        body.push_str(&format!("\nReason: {}", reason));
    }
    body
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, notice: &FlagNotice) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.moderator.clone())
            .subject(REVIEW_SUBJECT)
            .header(header::ContentType::TEXT_PLAIN)
            .body(compose_body(notice))
            .map_err(|e| NotifyError::DeliveryFailed(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

        tracing::info!(
            post_id = notice.post_id.0,
            moderator = %self.moderator,
            "Review request emailed"
        );
        Ok(())
    }
}
