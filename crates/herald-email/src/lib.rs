//! Email delivery for Herald: the `email` transport, SMTP and dry-run mail
//! senders, and the built-in HTML templates.

mod sender;
mod smtp;
mod transport;

pub mod error;
pub mod templates;

use std::sync::Arc;

use herald_core::{
  subscription::TransportCode, template::TemplateRegistry, transport::TransportRegistry,
};

pub use error::{Error, Result};
pub use sender::{DryRunSender, InlineImage, MailAttachment, MailSender, OutgoingMail};
pub use smtp::{SmtpConfig, SmtpMailSender};
pub use transport::{EmailTransport, SenderIdentity};

/// Code the email transport is registered under by [`register_defaults`].
pub const EMAIL_TRANSPORT: TransportCode = 1;

/// Install the email transport and every built-in template.
pub fn register_defaults(
  templates: &mut TemplateRegistry,
  transports: &mut TransportRegistry,
  sender: Arc<dyn MailSender>,
  from: SenderIdentity,
) -> herald_core::Result<()> {
  transports.register(EMAIL_TRANSPORT, "Email", move || {
    EmailTransport::new(sender.clone(), from.clone())
  })?;
  templates::register(templates)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_register_transport_and_templates() {
    let mut templates = TemplateRegistry::new();
    let mut transports = TransportRegistry::new();
    register_defaults(
      &mut templates,
      &mut transports,
      Arc::new(DryRunSender),
      SenderIdentity::default(),
    )
    .unwrap();

    assert_eq!(
      transports.transport_list().get(&EMAIL_TRANSPORT).map(String::as_str),
      Some("Email")
    );
    assert_eq!(templates.template_list().len(), 6);

    let transport = transports.transport_by_code(EMAIL_TRANSPORT).unwrap();
    assert_eq!(transport.kind(), EmailTransport::KIND);
    assert_eq!(transport.address(), None);
  }

  #[test]
  fn registering_twice_fails() {
    let mut templates = TemplateRegistry::new();
    let mut transports = TransportRegistry::new();
    let sender: Arc<dyn MailSender> = Arc::new(DryRunSender);
    register_defaults(&mut templates, &mut transports, sender.clone(), SenderIdentity::default())
      .unwrap();

    let err = register_defaults(&mut templates, &mut transports, sender, SenderIdentity::default())
      .unwrap_err();
    assert!(matches!(err, herald_core::Error::DuplicateOrInvalidRegistration(_)));
  }
}
