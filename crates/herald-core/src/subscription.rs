//! Subscriptions, cancellations, and the ownership hierarchy they hang off.
//!
//! A subscription is a standing opt-in anchored at one ownership level. A
//! cancellation is a separate record that suppresses one subscription for one
//! owner; it never mutates the subscription itself.

use serde::{Deserialize, Serialize};

use crate::recipient::Recipient;

pub type SubscriptionId = i64;
pub type OwnerId = i64;
pub type NotificationCode = u32;
pub type TemplateCode = u32;
pub type TransportCode = u32;

/// Owner id used by every [`OwnershipLevel::Base`] subscription.
pub const BASE_OWNER_ID: OwnerId = 0;

// ─── Ownership ───────────────────────────────────────────────────────────────

/// The granularity at which a subscription (or cancellation) is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnershipLevel {
  Profile,
  Group,
  Client,
  /// Organisation-wide default; always owned by [`BASE_OWNER_ID`].
  Base,
}

/// One `(level, id)` pair of an [`OwnerList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
  pub level: OwnershipLevel,
  pub id:    OwnerId,
}

impl Owner {
  pub fn new(level: OwnershipLevel, id: OwnerId) -> Self {
    match level {
      OwnershipLevel::Base => Self { level, id: BASE_OWNER_ID },
      _ => Self { level, id },
    }
  }
}

/// Every owner a recipient inherits subscriptions from, at most one per level.
///
/// Levels the recipient has no id for (no group, no client) are simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerList {
  owners: Vec<Owner>,
}

impl OwnerList {
  pub fn for_recipient<R: Recipient + ?Sized>(recipient: &R) -> Self {
    let candidates = [
      (OwnershipLevel::Profile, Some(recipient.id())),
      (OwnershipLevel::Group, recipient.group_id()),
      (OwnershipLevel::Client, recipient.client_id()),
      (OwnershipLevel::Base, Some(BASE_OWNER_ID)),
    ];

    let owners = candidates
      .into_iter()
      .filter_map(|(level, id)| id.map(|id| Owner::new(level, id)))
      .collect();

    Self { owners }
  }

  pub fn owners(&self) -> &[Owner] { &self.owners }

  /// The owner id registered for `level`, if any.
  pub fn id_for(&self, level: OwnershipLevel) -> Option<OwnerId> {
    self.owners.iter().find(|o| o.level == level).map(|o| o.id)
  }

  /// True iff `(level, id)` is exactly one of the entries. A subscription is
  /// only ever compared against the entry for its own level.
  pub fn contains(&self, level: OwnershipLevel, id: OwnerId) -> bool {
    self.id_for(level) == Some(id)
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  #[default]
  Active,
  /// Soft-removed; kept for history, never dispatched.
  Removed,
}

impl SubscriptionStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// A standing opt-in linking an owner, a notification, a template and a
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:                SubscriptionId,
  pub owner_id:          OwnerId,
  pub owner_type:        OwnershipLevel,
  pub notification_code: NotificationCode,
  pub template_code:     TemplateCode,
  pub transport_code:    TransportCode,
  /// Explicit destination; when empty the transport derives one from the
  /// recipient.
  pub address:           Option<String>,
  pub status:            SubscriptionStatus,
}

impl Subscription {
  /// The override address, if one is set and non-blank.
  pub fn address_override(&self) -> Option<&str> {
    self
      .address
      .as_deref()
      .filter(|a| !a.trim().is_empty())
  }
}

/// Input for creating a subscription; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
  pub owner_id:          OwnerId,
  pub owner_type:        OwnershipLevel,
  pub notification_code: NotificationCode,
  pub template_code:     TemplateCode,
  pub transport_code:    TransportCode,
  pub address:           Option<String>,
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// An explicit opt-out by one owner from one subscription, independent of who
/// created the subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCancellation {
  pub owner_id:        OwnerId,
  pub owner_type:      OwnershipLevel,
  pub subscription_id: SubscriptionId,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::recipient::Contact;

  fn contact(group_id: Option<OwnerId>, client_id: Option<OwnerId>) -> Contact {
    Contact {
      id: 7,
      group_id,
      client_id,
      email: None,
      mobile_phone: None,
    }
  }

  #[test]
  fn owner_list_covers_every_level() {
    let owners = OwnerList::for_recipient(&contact(Some(2), Some(3)));
    assert_eq!(owners.owners().len(), 4);
    assert_eq!(owners.id_for(OwnershipLevel::Profile), Some(7));
    assert_eq!(owners.id_for(OwnershipLevel::Group), Some(2));
    assert_eq!(owners.id_for(OwnershipLevel::Client), Some(3));
    assert_eq!(owners.id_for(OwnershipLevel::Base), Some(BASE_OWNER_ID));
  }

  #[test]
  fn owner_list_skips_missing_levels() {
    let owners = OwnerList::for_recipient(&contact(None, Some(3)));
    assert_eq!(owners.owners().len(), 3);
    assert_eq!(owners.id_for(OwnershipLevel::Group), None);
  }

  #[test]
  fn owner_list_matches_only_the_entry_for_its_level() {
    let owners = OwnerList::for_recipient(&contact(Some(2), Some(3)));
    assert!(owners.contains(OwnershipLevel::Group, 2));
    // id 2 is the group, not the client.
    assert!(!owners.contains(OwnershipLevel::Client, 2));
    assert!(!owners.contains(OwnershipLevel::Profile, 2));
  }

  #[test]
  fn base_owner_is_always_zero() {
    assert_eq!(Owner::new(OwnershipLevel::Base, 99).id, BASE_OWNER_ID);
  }

  #[test]
  fn blank_address_is_not_an_override() {
    let mut sub = Subscription {
      id:                1,
      owner_id:          7,
      owner_type:        OwnershipLevel::Profile,
      notification_code: 20,
      template_code:     20,
      transport_code:    1,
      address:           Some("   ".into()),
      status:            SubscriptionStatus::Active,
    };
    assert_eq!(sub.address_override(), None);

    sub.address = Some("a@b.com".into());
    assert_eq!(sub.address_override(), Some("a@b.com"));
  }
}
