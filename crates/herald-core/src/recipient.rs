//! The recipient of a dispatch — supplied by the surrounding application.

use serde::{Deserialize, Serialize};

use crate::subscription::OwnerId;

/// Read-only view of the person a notification is routed to.
///
/// The ids place the recipient in the ownership hierarchy; the contact fields
/// let transports derive a destination when a subscription carries no
/// explicit address.
pub trait Recipient: Send + Sync {
  fn id(&self) -> OwnerId;
  fn group_id(&self) -> Option<OwnerId>;
  fn client_id(&self) -> Option<OwnerId>;
  fn email(&self) -> Option<&str>;
  fn mobile_phone(&self) -> Option<&str>;
}

/// A plain-data [`Recipient`], e.g. deserialised from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:           OwnerId,
  #[serde(default)]
  pub group_id:     Option<OwnerId>,
  #[serde(default)]
  pub client_id:    Option<OwnerId>,
  #[serde(default)]
  pub email:        Option<String>,
  #[serde(default)]
  pub mobile_phone: Option<String>,
}

impl Recipient for Contact {
  fn id(&self) -> OwnerId { self.id }

  fn group_id(&self) -> Option<OwnerId> { self.group_id }

  fn client_id(&self) -> Option<OwnerId> { self.client_id }

  fn email(&self) -> Option<&str> { self.email.as_deref() }

  fn mobile_phone(&self) -> Option<&str> { self.mobile_phone.as_deref() }
}
