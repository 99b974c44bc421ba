//! Notification values — the events routed to subscribers.
//!
//! A notification is a language tag plus a kind-specific payload. Routing only
//! cares about the [`NotificationKind`]; templates read the payload fields.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The logical type of a notification. Mapped to a stable integer code by the
/// [`NotificationCatalog`](crate::catalog::NotificationCatalog).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
  RestorePassword,
  ChangePassword,
  OrderCreated,
  TravellerChoseApprover,
  ApproverConfirmedOrder,
  ApproverRejectedOrder,
}

impl NotificationKind {
  /// Human-readable title shown when listing notifications.
  pub fn title(self) -> &'static str {
    match self {
      Self::RestorePassword => "Password restore",
      Self::ChangePassword => "Password change",
      Self::OrderCreated => "Order created",
      Self::TravellerChoseApprover => "Approval requested",
      Self::ApproverConfirmedOrder => "Order approved",
      Self::ApproverRejectedOrder => "Order rejected",
    }
  }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePassword {
  pub profile_login: String,
  pub restore_link:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePassword {
  pub manager_name:  String,
  pub manager_email: String,
  pub profile_login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
  pub order_id:       i64,
  pub traveller_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravellerChoseApprover {
  pub order_id:       i64,
  pub traveller_name: String,
  pub approver_name:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverConfirmedOrder {
  pub order_id:      i64,
  pub approver_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverRejectedOrder {
  pub order_id:      i64,
  pub approver_name: String,
  #[serde(default)]
  pub reason:        Option<String>,
}

/// The kind-specific data of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
  RestorePassword(RestorePassword),
  ChangePassword(ChangePassword),
  OrderCreated(OrderCreated),
  TravellerChoseApprover(TravellerChoseApprover),
  ApproverConfirmedOrder(ApproverConfirmedOrder),
  ApproverRejectedOrder(ApproverRejectedOrder),
}

impl Payload {
  pub fn kind(&self) -> NotificationKind {
    match self {
      Self::RestorePassword(_) => NotificationKind::RestorePassword,
      Self::ChangePassword(_) => NotificationKind::ChangePassword,
      Self::OrderCreated(_) => NotificationKind::OrderCreated,
      Self::TravellerChoseApprover(_) => NotificationKind::TravellerChoseApprover,
      Self::ApproverConfirmedOrder(_) => NotificationKind::ApproverConfirmedOrder,
      Self::ApproverRejectedOrder(_) => NotificationKind::ApproverRejectedOrder,
    }
  }
}

// ─── Notification ────────────────────────────────────────────────────────────

/// A single event to be routed to every subscriber that opted in to it.
///
/// Serialised form:
///
/// ```json
/// { "language": "en", "kind": "change_password", "data": { ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  /// Language tag the message should be rendered in (e.g. `"en"`).
  pub language: String,
  #[serde(flatten)]
  pub payload:  Payload,
}

impl Notification {
  pub fn new(language: impl Into<String>, payload: Payload) -> Self {
    Self { language: language.into(), payload }
  }

  pub fn kind(&self) -> NotificationKind { self.payload.kind() }
}
