//! The [`MailSender`] seam between [`EmailTransport`](crate::EmailTransport)
//! and whatever actually submits mail.

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;

/// A fully addressed HTML email, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
  pub from_name:     String,
  pub from_address:  String,
  pub to:            String,
  pub subject:       String,
  /// HTML body with inline image references already rewritten to `cid:` URLs.
  pub html_body:     String,
  pub inline_images: Vec<InlineImage>,
  pub attachments:   Vec<MailAttachment>,
}

/// An image embedded in the body and referenced as `cid:<content_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineImage {
  pub path:       String,
  pub content_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailAttachment {
  pub path:      String,
  pub file_name: String,
}

#[async_trait]
pub trait MailSender: Send + Sync {
  async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Logs each mail instead of submitting it. Used when no SMTP server is
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSender;

#[async_trait]
impl MailSender for DryRunSender {
  async fn send(&self, mail: OutgoingMail) -> Result<()> {
    tracing::info!(
      to = %mail.to,
      subject = %mail.subject,
      inline_images = mail.inline_images.len(),
      attachments = mail.attachments.len(),
      "dry run: mail not submitted"
    );
    Ok(())
  }
}
