//! [`EmailTransport`] — delivers rendered messages as HTML email.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use herald_core::{
  DeliveryError, Error, Result,
  message::Message,
  recipient::Recipient,
  transport::{Transport, TransportKind},
};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::sender::{InlineImage, MailAttachment, MailSender, OutgoingMail};

/// The `From:` mailbox used for every message a transport sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
  pub name:    String,
  pub address: String,
}

impl Default for SenderIdentity {
  fn default() -> Self {
    Self { name: "site".to_string(), address: "no-reply@site".to_string() }
  }
}

pub struct EmailTransport {
  sender:  Arc<dyn MailSender>,
  from:    SenderIdentity,
  address: Option<String>,
}

impl EmailTransport {
  pub const KIND: TransportKind = TransportKind::new("email");

  pub fn new(sender: Arc<dyn MailSender>, from: SenderIdentity) -> Self {
    Self { sender, from, address: None }
  }
}

fn is_email(address: &str) -> bool { address.parse::<lettre::Address>().is_ok() }

// ─── Inline images ───────────────────────────────────────────────────────────

/// `<img src="path">` with a local path. URLs (`:`), whitespace and
/// non-ASCII paths are left untouched.
static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(<img src=["'])([A-Za-z0-9_/.\-,?!]+)(["'])"#).expect("valid regex")
});

fn content_id(path: &str) -> String { hex::encode(Sha256::digest(path.as_bytes())) }

/// Rewrite every `<img src="path">` to `<img src="cid:...">` and return the
/// images to embed, one per distinct path, in order of first appearance.
fn embed_images(body: &str) -> (String, Vec<InlineImage>) {
  let mut images: Vec<InlineImage> = Vec::new();
  for caps in IMG_SRC_RE.captures_iter(body) {
    let path = &caps[2];
    if !images.iter().any(|i| i.path == path) {
      images.push(InlineImage { path: path.to_string(), content_id: content_id(path) });
    }
  }

  let out = IMG_SRC_RE.replace_all(body, |caps: &Captures<'_>| {
    format!("{}cid:{}{}", &caps[1], content_id(&caps[2]), &caps[3])
  });

  (out.into_owned(), images)
}

// ─── Transport ───────────────────────────────────────────────────────────────

#[async_trait]
impl Transport for EmailTransport {
  fn kind(&self) -> TransportKind { Self::KIND }

  fn is_valid_address(&self, address: &str) -> bool { is_email(address) }

  fn set_address(&mut self, address: &str) -> Result<()> {
    let address = address.trim();
    if !is_email(address) {
      return Err(Error::InvalidAddress(address.to_string()));
    }
    self.address = Some(address.to_string());
    Ok(())
  }

  fn set_address_from_recipient(&mut self, recipient: &dyn Recipient) -> Result<()> {
    match recipient.email() {
      Some(email) if is_email(email) => {
        self.address = Some(email.to_string());
        Ok(())
      }
      other => Err(Error::InvalidAddress(other.unwrap_or_default().to_string())),
    }
  }

  fn address(&self) -> Option<&str> { self.address.as_deref() }

  async fn send(&mut self, message: &Message) -> Result<(), DeliveryError> {
    let to = match self.address.as_deref() {
      Some(address) if is_email(address) => address.to_string(),
      other => {
        return Err(DeliveryError::new(format!(
          "invalid address: {:?}",
          other.unwrap_or_default()
        )));
      }
    };

    let (html_body, inline_images) = embed_images(message.body());

    let mut attachments = Vec::with_capacity(message.attachments().len());
    for attachment in message.attachments() {
      let exists = tokio::fs::try_exists(&attachment.path).await.unwrap_or(false);
      if !exists {
        return Err(DeliveryError::new(format!(
          "attached file {:?} does not exist",
          attachment.path
        )));
      }
      attachments.push(MailAttachment {
        path:      attachment.path.clone(),
        file_name: attachment.file_name(),
      });
    }

    let mail = OutgoingMail {
      from_name: self.from.name.clone(),
      from_address: self.from.address.clone(),
      to,
      subject: message.title().to_string(),
      html_body,
      inline_images,
      attachments,
    };

    self
      .sender
      .send(mail)
      .await
      .map_err(|err| DeliveryError::with_source("mail sender rejected the message", err))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use herald_core::{message::Attachment, recipient::Contact};

  use super::*;

  #[derive(Default)]
  struct Outbox {
    sent: Mutex<Vec<OutgoingMail>>,
  }

  #[async_trait]
  impl MailSender for Outbox {
    async fn send(&self, mail: OutgoingMail) -> crate::Result<()> {
      self.sent.lock().unwrap().push(mail);
      Ok(())
    }
  }

  fn transport() -> (EmailTransport, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::default());
    (EmailTransport::new(outbox.clone(), SenderIdentity::default()), outbox)
  }

  #[test]
  fn set_address_trims_and_validates() {
    let (mut t, _) = transport();
    t.set_address("  user@example.com \n").unwrap();
    assert_eq!(t.address(), Some("user@example.com"));

    let err = t.set_address("not-an-email").unwrap_err();
    assert!(matches!(err, Error::InvalidAddress(a) if a == "not-an-email"));
    assert_eq!(t.address(), Some("user@example.com"));
  }

  #[test]
  fn address_from_recipient() {
    let (mut t, _) = transport();
    let with_email = Contact { id: 1, email: Some("a@example.com".into()), ..Default::default() };
    t.set_address_from_recipient(&with_email).unwrap();
    assert_eq!(t.address(), Some("a@example.com"));

    let (mut t, _) = transport();
    let without = Contact { id: 2, ..Default::default() };
    assert!(matches!(
      t.set_address_from_recipient(&without),
      Err(Error::InvalidAddress(_))
    ));
    assert_eq!(t.address(), None);
  }

  #[test]
  fn images_are_rewritten_once_per_path() {
    let body = r#"<img src="/img/logo.png"> and <img src='/img/logo.png' alt="x"> <img src="https://cdn/x.png">"#;
    let (out, images) = embed_images(body);

    let cid = content_id("/img/logo.png");
    assert_eq!(cid.len(), 64);
    assert_eq!(images, vec![InlineImage { path: "/img/logo.png".into(), content_id: cid.clone() }]);
    assert_eq!(
      out,
      format!(
        r#"<img src="cid:{cid}"> and <img src='cid:{cid}' alt="x"> <img src="https://cdn/x.png">"#
      )
    );
  }

  #[test]
  fn non_ascii_and_empty_paths_are_not_embedded() {
    let body = r#"<img src="/img/логотип.png"> <img src="">"#;
    let (out, images) = embed_images(body);
    assert_eq!(out, body);
    assert!(images.is_empty());
  }

  #[test]
  fn body_without_images_is_untouched() {
    let (out, images) = embed_images("<p>plain</p>");
    assert_eq!(out, "<p>plain</p>");
    assert!(images.is_empty());
  }

  #[tokio::test]
  async fn send_hands_mail_to_sender() {
    let (mut t, outbox) = transport();
    t.set_address("user@example.com").unwrap();

    t.send(&Message::new("Subject", "<b>hi</b>")).await.unwrap();

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "user@example.com");
    assert_eq!(sent[0].subject, "Subject");
    assert_eq!(sent[0].from_address, "no-reply@site");
  }

  #[tokio::test]
  async fn send_without_address_fails() {
    let (mut t, outbox) = transport();
    let err = t.send(&Message::new("Subject", "body")).await.unwrap_err();
    assert!(err.message.contains("invalid address"));
    assert!(outbox.sent.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn missing_attachment_fails_before_sending() {
    let (mut t, outbox) = transport();
    t.set_address("user@example.com").unwrap();

    let message = Message::new("Subject", "body").with_attachment(Attachment {
      path: "/no/such/file.pdf".into(),
      name: "ticket".into(),
      kind: "pdf".into(),
    });
    let err = t.send(&message).await.unwrap_err();
    assert!(err.message.contains("/no/such/file.pdf"));
    assert!(outbox.sent.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn existing_attachment_is_forwarded() {
    let path = std::env::temp_dir().join("herald-email-attachment-test.txt");
    tokio::fs::write(&path, b"ticket").await.unwrap();

    let (mut t, outbox) = transport();
    t.set_address("user@example.com").unwrap();
    let message = Message::new("Subject", "body").with_attachment(Attachment {
      path: path.to_string_lossy().into_owned(),
      name: "ticket".into(),
      kind: "txt".into(),
    });
    t.send(&message).await.unwrap();

    let sent = outbox.sent.lock().unwrap();
    assert_eq!(sent[0].attachments[0].file_name, "ticket.txt");
  }
}
