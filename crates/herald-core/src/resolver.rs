//! [`SubscriptionResolver`] — which subscriptions are live for one recipient
//! and one notification.

use std::{collections::HashSet, sync::Arc};

use crate::{
  Error, Result,
  catalog::NotificationCatalog,
  notification::Notification,
  recipient::Recipient,
  store::{CancellationStore, SubscriptionStore},
  subscription::{OwnerList, Subscription, SubscriptionId},
};

/// Combines the subscription and cancellation repositories into the set of
/// active subscriptions across all four ownership levels.
pub struct SubscriptionResolver<S, C> {
  subscriptions: Arc<S>,
  cancellations: Arc<C>,
  catalog:       Arc<NotificationCatalog>,
}

impl<S, C> SubscriptionResolver<S, C>
where
  S: SubscriptionStore,
  C: CancellationStore,
{
  pub fn new(
    subscriptions: Arc<S>,
    cancellations: Arc<C>,
    catalog: Arc<NotificationCatalog>,
  ) -> Self {
    Self { subscriptions, cancellations, catalog }
  }

  /// Subscriptions matching the notification at any of the recipient's
  /// levels, minus those cancelled by one of the recipient's owners.
  ///
  /// Order follows the subscription repository's response. Subscriptions for
  /// the same notification at several levels are all kept.
  pub async fn resolve_active(
    &self,
    recipient: &dyn Recipient,
    notification: &Notification,
  ) -> Result<Vec<Subscription>> {
    let owners = OwnerList::for_recipient(recipient);
    let notification_code = self.catalog.code_for(notification)?;

    let subscriptions = self
      .subscriptions
      .find_active_by_notification_and_owners(notification_code, &owners)
      .await
      .map_err(Error::store)?;

    if subscriptions.is_empty() {
      return Ok(subscriptions);
    }

    let ids: Vec<SubscriptionId> = subscriptions.iter().map(|s| s.id).collect();

    let cancelled: HashSet<SubscriptionId> = self
      .cancellations
      .find_by_ids_and_owners(&ids, &owners)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|c| c.subscription_id)
      .collect();

    tracing::debug!(
      recipient = recipient.id(),
      notification_code,
      matched = subscriptions.len(),
      cancelled = cancelled.len(),
      "resolved subscriptions"
    );

    Ok(
      subscriptions
        .into_iter()
        .filter(|s| !cancelled.contains(&s.id))
        .collect(),
    )
  }
}
