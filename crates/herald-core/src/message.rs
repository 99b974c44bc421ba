//! The rendered output of a template, consumed by a transport.

use serde::{Deserialize, Serialize};

/// A file attached to a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
  /// Location of the file on disk.
  pub path: String,
  /// File name presented to the reader, without extension.
  pub name: String,
  /// File extension / kind, e.g. `"pdf"`.
  pub kind: String,
}

impl Attachment {
  /// `name.kind`, the file name a mail client shows.
  pub fn file_name(&self) -> String { format!("{}.{}", self.name, self.kind) }
}

/// Immutable title + body + ordered attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  title:       String,
  body:        String,
  attachments: Vec<Attachment>,
}

impl Message {
  pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self { title: title.into(), body: body.into(), attachments: Vec::new() }
  }

  pub fn with_attachment(mut self, attachment: Attachment) -> Self {
    self.attachments.push(attachment);
    self
  }

  pub fn title(&self) -> &str { &self.title }

  pub fn body(&self) -> &str { &self.body }

  pub fn attachments(&self) -> &[Attachment] { &self.attachments }
}
