//! SMTP submission through `lettre`'s async transport.

use std::path::Path;

use async_trait::async_trait;
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use serde::Deserialize;

use crate::{
  Error, Result,
  sender::{MailSender, OutgoingMail},
};

const DEFAULT_SMTP_PORT: u16 = 587;

fn default_port() -> u16 { DEFAULT_SMTP_PORT }

fn default_from_name() -> String { "site".to_string() }

fn default_from_address() -> String { "no-reply@site".to_string() }

/// SMTP relay settings, usually the `[smtp]` table of the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_from_address")]
  pub from_address: String,
  #[serde(default = "default_from_name")]
  pub from_name:    String,
  #[serde(default)]
  pub username:     Option<String>,
  #[serde(default)]
  pub password:     Option<String>,
}

/// Submits mail to an SMTP relay over STARTTLS.
pub struct SmtpMailSender {
  mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
  pub fn new(config: &SmtpConfig) -> Result<Self> {
    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
      .port(config.port);

    if let (Some(user), Some(pass)) = (&config.username, &config.password) {
      builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
    }

    Ok(Self { mailer: builder.build() })
  }
}

/// MIME type for an inline image, by file extension.
fn image_content_type(path: &str) -> &'static str {
  let ext = Path::new(path)
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);

  match ext.as_deref() {
    Some("png") => "image/png",
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("svg") => "image/svg+xml",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

fn parse_content_type(value: &str) -> Result<ContentType> {
  ContentType::parse(value).map_err(|_| Error::ContentType(value.to_string()))
}

async fn read_file(path: &str) -> Result<Vec<u8>> {
  tokio::fs::read(path).await.map_err(|source| Error::Io {
    path: path.into(),
    source,
  })
}

/// Assemble `mixed(related(html, images...), attachments...)`.
async fn build_message(mail: &OutgoingMail) -> Result<Message> {
  let mut related = MultiPart::related().singlepart(SinglePart::html(mail.html_body.clone()));
  for image in &mail.inline_images {
    let bytes = read_file(&image.path).await?;
    let content_type = parse_content_type(image_content_type(&image.path))?;
    related = related
      .singlepart(Attachment::new_inline(image.content_id.clone()).body(bytes, content_type));
  }

  let mut mixed = MultiPart::mixed().multipart(related);
  for attachment in &mail.attachments {
    let bytes = read_file(&attachment.path).await?;
    let content_type = parse_content_type("application/octet-stream")?;
    mixed = mixed
      .singlepart(Attachment::new(attachment.file_name.clone()).body(bytes, content_type));
  }

  let from = Mailbox::new(Some(mail.from_name.clone()), mail.from_address.parse()?);
  let to = Mailbox::new(None, mail.to.parse()?);

  Ok(
    Message::builder()
      .from(from)
      .to(to)
      .subject(mail.subject.clone())
      .multipart(mixed)?,
  )
}

#[async_trait]
impl MailSender for SmtpMailSender {
  async fn send(&self, mail: OutgoingMail) -> Result<()> {
    let message = build_message(&mail).await?;
    self.mailer.send(message).await?;

    tracing::info!(to = %mail.to, subject = %mail.subject, "mail submitted");
    Ok(())
  }
}
