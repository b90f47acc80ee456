use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::Config;
use crate::errors::AppError;

/// A rendered HTML email waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// `None` when no recipient is configured; sending then fails.
    pub to: Option<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError>;
}

/// SMTP relay mailer (implicit TLS, authenticated with the site's mail account).
///
/// Holds no connection pool: every send opens its own connection.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Option<Mailbox>,
}

/// Builds `"<display name>" <EMAIL_USER>`, or `None` when no account is configured.
pub fn sender_mailbox(config: &Config) -> Result<Option<Mailbox>, AppError> {
    let Some(user) = config.email_user.as_deref() else {
        return Ok(None);
    };
    let address: Address = user.parse().map_err(|e| {
        AppError::InternalError(format!("EMAIL_USER is not a valid address: {}", e))
    })?;
    Ok(Some(Mailbox::new(Some(config.mail_from_name.clone()), address)))
}

fn build_message(from: Option<&Mailbox>, email: OutboundEmail) -> Result<Message, AppError> {
    let from = from
        .cloned()
        .ok_or_else(|| AppError::Dispatch("Sender identity not configured".to_string()))?;
    let to = email
        .to
        .as_deref()
        .ok_or_else(|| AppError::Dispatch("No recipients defined".to_string()))?;

    let mut builder = Message::builder()
        .from(from)
        .to(Mailbox::new(None, to.parse::<Address>()?))
        .subject(email.subject);

    if let Some(reply_to) = email.reply_to.as_deref() {
        builder = builder.reply_to(Mailbox::new(None, reply_to.parse::<Address>()?));
    }

    Ok(builder.header(ContentType::TEXT_HTML).body(email.html)?)
}

impl SmtpMailer {
    /// Creates a new `SmtpMailer`.
    ///
    /// A missing `EMAIL_USER` is not an error here; sends fail instead.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create SMTP transport: {}", e))
            })?;

        if let (Some(user), Some(pass)) = (&config.email_user, &config.email_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: sender_mailbox(config)?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        let subject = email.subject.clone();
        let message = build_message(self.from.as_ref(), email)?;

        let response = self.transport.send(message).await?;
        tracing::debug!(
            "SMTP accepted '{}' (code {})",
            subject,
            response.code()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: Option<&str>) -> OutboundEmail {
        OutboundEmail {
            to: to.map(str::to_string),
            reply_to: Some("asha@example.com".to_string()),
            subject: "New Lead: Asha (Inquiry)".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    fn sender() -> Mailbox {
        let config = Config {
            email_user: Some("site@example.com".to_string()),
            ..Config::default()
        };
        sender_mailbox(&config).unwrap().unwrap()
    }

    #[test]
    fn test_sender_mailbox_absent_without_account() {
        assert!(sender_mailbox(&Config::default()).unwrap().is_none());
    }

    #[test]
    fn test_sender_mailbox_rejects_bad_account() {
        let config = Config {
            email_user: Some("not an address".to_string()),
            ..Config::default()
        };
        assert!(sender_mailbox(&config).is_err());
    }

    #[test]
    fn test_build_message_requires_sender_identity() {
        let err = build_message(None, email(Some("owner@example.com"))).unwrap_err();
        assert!(matches!(err, AppError::Dispatch(_)));
    }

    #[test]
    fn test_build_message_requires_recipient() {
        let err = build_message(Some(&sender()), email(None)).unwrap_err();
        assert!(matches!(err, AppError::Dispatch(ref m) if m == "No recipients defined"));
    }

    #[test]
    fn test_build_message_sets_headers() {
        let message = build_message(Some(&sender()), email(Some("owner@example.com"))).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("SecureLife Fincorp"));
        assert!(raw.contains("<site@example.com>"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Reply-To: asha@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[test]
    fn test_invalid_recipient_is_a_dispatch_error() {
        let err = build_message(Some(&sender()), email(Some("not-an-address"))).unwrap_err();
        assert!(matches!(err, AppError::Dispatch(_)));
    }
}
