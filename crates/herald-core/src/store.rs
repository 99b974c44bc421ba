//! Repository traits the resolver queries.
//!
//! Implemented by storage backends (e.g. `herald-store-sqlite`). The dispatch
//! path only reads through these traits; creating, removing and cancelling
//! subscriptions is the backend's own API.

use std::future::Future;

use crate::subscription::{
  NotificationCode, OwnerList, Subscription, SubscriptionCancellation, SubscriptionId,
};

/// Read access to subscriptions for dispatch.
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All [`Active`](crate::subscription::SubscriptionStatus::Active)
  /// subscriptions for `notification_code` whose `(owner_type, owner_id)`
  /// equals one of the entries in `owners`.
  ///
  /// Subscriptions at different levels are returned side by side, never
  /// merged.
  fn find_active_by_notification_and_owners<'a>(
    &'a self,
    notification_code: NotificationCode,
    owners: &'a OwnerList,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;
}

/// Read access to cancellations for dispatch.
pub trait CancellationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All cancellations whose `subscription_id` is in `subscription_ids` and
  /// whose `(owner_type, owner_id)` is one of the entries in `owners`.
  fn find_by_ids_and_owners<'a>(
    &'a self,
    subscription_ids: &'a [SubscriptionId],
    owners: &'a OwnerList,
  ) -> impl Future<Output = Result<Vec<SubscriptionCancellation>, Self::Error>> + Send + 'a;
}
