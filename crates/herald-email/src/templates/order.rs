//! Order approval workflow mails. English only.

use herald_core::{
  Result,
  message::Message,
  notification::{Notification, NotificationKind, Payload},
  template::Template,
  transport::TransportKind,
};

use super::{escape, unsupported_language, wrong_payload};
use crate::EmailTransport;

const LANGUAGES: &[&str] = &["en"];
const TRANSPORTS: &[TransportKind] = &[EmailTransport::KIND];

fn english(template: &dyn Template, notification: &Notification) -> Result<()> {
  if notification.language == "en" {
    Ok(())
  } else {
    Err(unsupported_language(template, notification))
  }
}

pub struct OrderCreatedTemplate;

impl Template for OrderCreatedTemplate {
  fn name(&self) -> &'static str { "order_created_email" }

  fn supported_notification(&self) -> NotificationKind { NotificationKind::OrderCreated }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::OrderCreated(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    english(self, notification)?;

    Ok(Message::new(
      format!("Order #{} created", p.order_id),
      format!(
        "<p>{} has created order #{}.</p>",
        escape(&p.traveller_name),
        p.order_id
      ),
    ))
  }
}

pub struct TravellerChoseApproverTemplate;

impl Template for TravellerChoseApproverTemplate {
  fn name(&self) -> &'static str { "traveller_chose_approver_email" }

  fn supported_notification(&self) -> NotificationKind {
    NotificationKind::TravellerChoseApprover
  }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::TravellerChoseApprover(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    english(self, notification)?;

    Ok(Message::new(
      format!("Order #{} awaits your approval", p.order_id),
      format!(
        "<p>Hello, {}!</p><p>{} asks you to approve order #{}.</p>",
        escape(&p.approver_name),
        escape(&p.traveller_name),
        p.order_id
      ),
    ))
  }
}

pub struct ApproverConfirmedOrderTemplate;

impl Template for ApproverConfirmedOrderTemplate {
  fn name(&self) -> &'static str { "approver_confirmed_order_email" }

  fn supported_notification(&self) -> NotificationKind {
    NotificationKind::ApproverConfirmedOrder
  }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::ApproverConfirmedOrder(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    english(self, notification)?;

    Ok(Message::new(
      format!("Order #{} approved", p.order_id),
      format!(
        "<p>{} has approved order #{}.</p>",
        escape(&p.approver_name),
        p.order_id
      ),
    ))
  }
}

pub struct ApproverRejectedOrderTemplate;

impl Template for ApproverRejectedOrderTemplate {
  fn name(&self) -> &'static str { "approver_rejected_order_email" }

  fn supported_notification(&self) -> NotificationKind {
    NotificationKind::ApproverRejectedOrder
  }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::ApproverRejectedOrder(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    english(self, notification)?;

    let reason = match p.reason.as_deref().map(str::trim) {
      Some(reason) if !reason.is_empty() => format!("<p>Reason: {}</p>", escape(reason)),
      _ => String::new(),
    };

    Ok(Message::new(
      format!("Order #{} rejected", p.order_id),
      format!(
        "<p>{} has rejected order #{}.</p>{reason}",
        escape(&p.approver_name),
        p.order_id
      ),
    ))
  }
}
