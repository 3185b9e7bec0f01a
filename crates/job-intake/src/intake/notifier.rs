use lettre::address::Address;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

use super::domain::Attachment;

/// Port that implies implicit TLS; any other port negotiates STARTTLS.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// One outbound message as handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub subject: String,
    pub body: String,
    pub to: String,
    pub attachments: Vec<Attachment>,
    pub reply_to: Option<String>,
}

/// Transport seam so the intake service can be exercised without a relay.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail relay is not configured: missing {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },
    #[error("could not compose message: {0}")]
    Message(String),
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// MIME type inferred from the filename extension, `application/octet-stream`
/// when unknown.
pub fn content_type_for(filename: &str) -> mime::Mime {
    mime_guess::from_path(filename).first_or_octet_stream()
}

/// Fully specified relay settings, resolved per send.
struct RelaySettings<'a> {
    host: &'a str,
    port: u16,
    user: &'a str,
    password: &'a str,
    from: Mailbox,
}

/// SMTP mailer over lettre. Every send opens its own TLS session and drops it
/// afterwards; nothing is pooled between messages.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn relay_settings(&self) -> Result<RelaySettings<'_>, NotifyError> {
        let config = &self.config;
        let mut missing = Vec::new();
        if config.host.is_none() {
            missing.push("SMTP_HOST");
        }
        if config.port == 0 {
            missing.push("SMTP_PORT");
        }
        if config.user.is_none() {
            missing.push("SMTP_USER");
        }
        if config.password.is_none() {
            missing.push("SMTP_PASS");
        }
        if config.from_email.is_none() {
            missing.push("FROM_EMAIL");
        }

        match (
            config.host.as_deref(),
            config.user.as_deref(),
            config.password.as_deref(),
            config.from_email.as_deref(),
        ) {
            (Some(host), Some(user), Some(password), Some(from_email)) if missing.is_empty() => {
                let address: Address = from_email
                    .parse()
                    .map_err(|err| NotifyError::Message(format!("sender {from_email}: {err}")))?;
                let name = Some(config.from_name.clone()).filter(|name| !name.is_empty());
                Ok(RelaySettings {
                    host,
                    port: config.port,
                    user,
                    password,
                    from: Mailbox::new(name, address),
                })
            }
            _ => Err(NotifyError::Configuration { missing }),
        }
    }
}

fn mailbox(raw: &str, role: &str) -> Result<Mailbox, NotifyError> {
    raw.trim()
        .parse::<Mailbox>()
        .map_err(|err| NotifyError::Message(format!("{role} {raw}: {err}")))
}

pub(crate) fn compose(email: &OutboundEmail, from: Mailbox) -> Result<Message, NotifyError> {
    let mut builder = Message::builder()
        .from(from)
        .to(mailbox(&email.to, "recipient")?)
        .subject(email.subject.clone());
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(mailbox(reply_to, "reply-to")?);
    }

    let message = if email.attachments.is_empty() {
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
    } else {
        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
        for attachment in &email.attachments {
            let mime = content_type_for(&attachment.filename);
            let content_type = ContentType::parse(mime.essence_str())
                .map_err(|err| NotifyError::Message(format!("{}: {err}", attachment.filename)))?;
            parts = parts.singlepart(
                MimeAttachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|err| NotifyError::Message(err.to_string()))
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let relay = self.relay_settings()?;
        let message = compose(email, relay.from)?;

        let builder = if relay.port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(relay.host)
        } else {
            SmtpTransport::starttls_relay(relay.host)
        }
        .map_err(|err| NotifyError::Delivery(err.to_string()))?;

        let transport = builder
            .port(relay.port)
            .credentials(Credentials::new(
                relay.user.to_string(),
                relay.password.to_string(),
            ))
            .build();

        tracing::debug!(
            host = relay.host,
            port = relay.port,
            attachments = email.attachments.len(),
            "sending message"
        );
        transport
            .send(&message)
            .map_err(|err| NotifyError::Delivery(err.to_string()))?;
        Ok(())
    }
}
