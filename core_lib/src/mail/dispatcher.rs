//! Sends uploaded files as email attachments through an SMTP relay.

use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

const SUBJECT: &str = "File delivery";
const BODY_TEXT: &str = "Hello!\nPlease find the attached file.\n";

/// One outgoing delivery, constructed per request and consumed immediately.
#[derive(Debug)]
pub struct EmailJob {
    pub recipients: Vec<Mailbox>,
    pub attachment: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Recipient list is empty")]
    EmptyRecipients,

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("Invalid SMTP_PORT value: {0}")]
    InvalidPort(String),

    #[error("Invalid EMAIL_USER sender address: {0}")]
    InvalidSender(String),

    #[error("Invalid attachment content type: {0}")]
    InvalidContentType(String),

    #[error("Failed to encode attachment")]
    Encoding,

    #[error("Failed to assemble message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Split a comma-separated `emails` form field into parsed mailboxes.
///
/// An empty list after splitting and a malformed address both discard the
/// whole request.
pub fn parse_recipients(raw: &str) -> Result<Vec<Mailbox>, MailError> {
    let addresses: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if addresses.is_empty() {
        return Err(MailError::EmptyRecipients);
    }

    addresses
        .into_iter()
        .map(|addr| {
            addr.parse::<Mailbox>()
                .map_err(|_| MailError::InvalidRecipient(addr.to_string()))
        })
        .collect()
}

/// Assemble the outgoing message: a plain-text body part plus the file as a
/// base64-encoded attachment part, addressed to every recipient.
pub fn build_message(from: &Mailbox, job: &EmailJob) -> Result<Message, MailError> {
    let content_type = ContentType::parse(&job.mime_type)
        .map_err(|_| MailError::InvalidContentType(job.mime_type.clone()))?;

    let mut builder = Message::builder().from(from.clone()).subject(SUBJECT);
    for recipient in &job.recipients {
        builder = builder.to(recipient.clone());
    }

    // Attachments always travel base64-encoded, whatever their content.
    let body = Body::new_with_encoding(job.attachment.clone(), ContentTransferEncoding::Base64)
        .map_err(|_| MailError::Encoding)?;
    let attachment = Attachment::new(job.filename.clone()).body(body, content_type);

    let text_part = SinglePart::builder()
        .header(ContentType::TEXT_PLAIN)
        .body(BODY_TEXT.to_string());

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(text_part)
            .singlepart(attachment),
    )?;

    Ok(message)
}

/// SMTP submission client, built once at startup from the environment.
#[derive(Clone)]
pub struct MailDispatcher {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl MailDispatcher {
    /// Read `EMAIL_USER`, `EMAIL_PASSWORD`, `SMTP_SERVER` (host) and
    /// `SMTP_PORT` (port) from the environment and build a plain-auth
    /// transport to the relay.
    pub fn from_env() -> Result<Self, MailError> {
        let user = require_env("EMAIL_USER")?;
        let password = require_env("EMAIL_PASSWORD")?;
        let host = require_env("SMTP_SERVER")?;
        let port_raw = require_env("SMTP_PORT")?;

        let port: u16 = port_raw
            .parse()
            .map_err(|_| MailError::InvalidPort(port_raw))?;

        let from: Mailbox = user
            .parse()
            .map_err(|_| MailError::InvalidSender(user.clone()))?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host.as_str())
            .port(port)
            .credentials(Credentials::new(user, password))
            .build();

        info!(host = %host, port = port, "mail dispatcher initialized");

        Ok(Self { mailer, from })
    }

    /// Submit one job to the relay. Attempted exactly once, no retries.
    pub async fn send(&self, job: EmailJob) -> Result<(), MailError> {
        let recipient_count = job.recipients.len();
        let message = build_message(&self.from, &job)?;

        self.mailer.send(message).await?;

        info!(
            filename = %job.filename,
            recipients = recipient_count,
            "attachment email submitted"
        );
        Ok(())
    }
}

fn require_env(name: &'static str) -> Result<String, MailError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(MailError::MissingEnv(name))
}
