//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use herald_core::{
  catalog::NotificationCatalog,
  notification::{ChangePassword, Notification, Payload},
  recipient::Contact,
  resolver::SubscriptionResolver,
  store::{CancellationStore, SubscriptionStore},
  subscription::{
    NewSubscription, NotificationCode, OwnerList, OwnershipLevel,
    SubscriptionCancellation, SubscriptionStatus,
  },
};

use crate::{Error, SqliteStore};

const CHANGE_PASSWORD: NotificationCode = 20;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn recipient() -> Contact {
  Contact {
    id: 7,
    group_id: Some(3),
    client_id: Some(1),
    email: Some("traveller@example.com".into()),
    ..Default::default()
  }
}

fn change_password() -> Notification {
  Notification::new(
    "en",
    Payload::ChangePassword(ChangePassword {
      manager_name:  "Olga".into(),
      manager_email: "olga@example.com".into(),
      profile_login: "traveller".into(),
    }),
  )
}

fn new_sub(level: OwnershipLevel, owner_id: i64) -> NewSubscription {
  NewSubscription {
    owner_id,
    owner_type: level,
    notification_code: CHANGE_PASSWORD,
    template_code: 20,
    transport_code: 1,
    address: None,
  }
}

fn cancellation(
  subscription_id: i64,
  level: OwnershipLevel,
  owner_id: i64,
) -> SubscriptionCancellation {
  SubscriptionCancellation { owner_id, owner_type: level, subscription_id }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_subscription() {
  let s = store().await;

  let sub = s
    .add_subscription(NewSubscription {
      address: Some("  ops@example.com ".into()),
      ..new_sub(OwnershipLevel::Group, 3)
    })
    .await
    .unwrap();
  assert_eq!(sub.owner_type, OwnershipLevel::Group);
  assert_eq!(sub.address.as_deref(), Some("ops@example.com"));
  assert_eq!(sub.status, SubscriptionStatus::Active);

  let fetched = s.get_subscription(sub.id).await.unwrap().unwrap();
  assert_eq!(fetched, sub);
}

#[tokio::test]
async fn get_subscription_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subscription(404).await.unwrap().is_none());
}

#[tokio::test]
async fn base_subscriptions_are_stored_with_owner_zero() {
  let s = store().await;
  let sub = s
    .add_subscription(new_sub(OwnershipLevel::Base, 99))
    .await
    .unwrap();
  assert_eq!(sub.owner_id, 0);

  let found = s.find_by_owner(OwnershipLevel::Base, 0).await.unwrap();
  assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn blank_address_is_stored_as_none() {
  let s = store().await;
  let sub = s
    .add_subscription(NewSubscription {
      address: Some("   ".into()),
      ..new_sub(OwnershipLevel::Profile, 7)
    })
    .await
    .unwrap();
  assert!(sub.address.is_none());
}

#[tokio::test]
async fn soft_remove_hides_from_queries() {
  let s = store().await;
  let sub = s
    .add_subscription(new_sub(OwnershipLevel::Profile, 7))
    .await
    .unwrap();

  let removed = s.soft_remove(sub.id).await.unwrap();
  assert_eq!(removed.status, SubscriptionStatus::Removed);

  // Row survives with its new status.
  let fetched = s.get_subscription(sub.id).await.unwrap().unwrap();
  assert_eq!(fetched.status, SubscriptionStatus::Removed);

  assert!(s.find_by_owner(OwnershipLevel::Profile, 7).await.unwrap().is_empty());

  let owners = OwnerList::for_recipient(&recipient());
  let active = s
    .find_active_by_notification_and_owners(CHANGE_PASSWORD, &owners)
    .await
    .unwrap();
  assert!(active.is_empty());
}

#[tokio::test]
async fn soft_remove_twice_fails() {
  let s = store().await;
  let sub = s
    .add_subscription(new_sub(OwnershipLevel::Profile, 7))
    .await
    .unwrap();
  s.soft_remove(sub.id).await.unwrap();

  let err = s.soft_remove(sub.id).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyRemoved(id) if id == sub.id));
}

#[tokio::test]
async fn soft_remove_missing_fails() {
  let s = store().await;
  let err = s.soft_remove(12).await.unwrap_err();
  assert!(matches!(err, Error::SubscriptionNotFound(12)));
}

#[tokio::test]
async fn find_active_matches_every_owner_level() {
  let s = store().await;
  let profile = s.add_subscription(new_sub(OwnershipLevel::Profile, 7)).await.unwrap();
  let group = s.add_subscription(new_sub(OwnershipLevel::Group, 3)).await.unwrap();
  let client = s.add_subscription(new_sub(OwnershipLevel::Client, 1)).await.unwrap();
  let base = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();

  // Noise: another profile, another notification, a group id that equals the
  // recipient's profile id.
  s.add_subscription(new_sub(OwnershipLevel::Profile, 8)).await.unwrap();
  s.add_subscription(NewSubscription {
    notification_code: 10,
    ..new_sub(OwnershipLevel::Profile, 7)
  })
  .await
  .unwrap();
  s.add_subscription(new_sub(OwnershipLevel::Group, 7)).await.unwrap();

  let owners = OwnerList::for_recipient(&recipient());
  let ids: Vec<_> = s
    .find_active_by_notification_and_owners(CHANGE_PASSWORD, &owners)
    .await
    .unwrap()
    .into_iter()
    .map(|sub| sub.id)
    .collect();

  assert_eq!(ids, vec![profile.id, group.id, client.id, base.id]);
}

#[tokio::test]
async fn find_active_skips_missing_group_and_client() {
  let s = store().await;
  s.add_subscription(new_sub(OwnershipLevel::Group, 3)).await.unwrap();
  let base = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();

  let lone = Contact { id: 7, ..Default::default() };
  let owners = OwnerList::for_recipient(&lone);
  let found = s
    .find_active_by_notification_and_owners(CHANGE_PASSWORD, &owners)
    .await
    .unwrap();

  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, base.id);
}

// ─── Cancellations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn cancel_and_find() {
  let s = store().await;
  let sub = s.add_subscription(new_sub(OwnershipLevel::Client, 1)).await.unwrap();

  let recorded = s
    .cancel(cancellation(sub.id, OwnershipLevel::Profile, 7))
    .await
    .unwrap();
  assert_eq!(recorded.subscription_id, sub.id);

  let by_owner = s
    .find_cancellations_by_owner(OwnershipLevel::Profile, 7)
    .await
    .unwrap();
  assert_eq!(by_owner, vec![recorded.clone()]);

  let exact = s
    .find_cancellation_for_owner(sub.id, OwnershipLevel::Profile, 7)
    .await
    .unwrap();
  assert_eq!(exact, Some(recorded));

  let other = s
    .find_cancellation_for_owner(sub.id, OwnershipLevel::Profile, 8)
    .await
    .unwrap();
  assert!(other.is_none());
}

#[tokio::test]
async fn cancel_unknown_subscription_fails() {
  let s = store().await;
  let err = s
    .cancel(cancellation(55, OwnershipLevel::Profile, 7))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubscriptionNotFound(55)));
}

#[tokio::test]
async fn cancel_twice_fails() {
  let s = store().await;
  let sub = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();
  s.cancel(cancellation(sub.id, OwnershipLevel::Group, 3)).await.unwrap();

  let err = s
    .cancel(cancellation(sub.id, OwnershipLevel::Group, 3))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyCancelled { owner_id: 3, .. }));
}

#[tokio::test]
async fn concurrent_cancels_record_one_row() {
  let s = store().await;
  let sub = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();
  let other = s.clone();

  let (a, b) = tokio::join!(
    s.cancel(cancellation(sub.id, OwnershipLevel::Group, 3)),
    other.cancel(cancellation(sub.id, OwnershipLevel::Group, 3)),
  );

  let results = [a, b];
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert!(
    results
      .iter()
      .any(|r| matches!(r, Err(Error::AlreadyCancelled { owner_id: 3, .. })))
  );
  assert_eq!(
    s.find_cancellations_by_owner(OwnershipLevel::Group, 3)
      .await
      .unwrap()
      .len(),
    1
  );
}

#[tokio::test]
async fn restore_removes_cancellation() {
  let s = store().await;
  let sub = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();
  s.cancel(cancellation(sub.id, OwnershipLevel::Profile, 7)).await.unwrap();

  s.restore(sub.id, OwnershipLevel::Profile, 7).await.unwrap();
  assert!(
    s.find_cancellations_by_owner(OwnershipLevel::Profile, 7)
      .await
      .unwrap()
      .is_empty()
  );

  let err = s
    .restore(sub.id, OwnershipLevel::Profile, 7)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CancellationNotFound { .. }));
}

#[tokio::test]
async fn find_by_ids_and_owners_filters_both() {
  let s = store().await;
  let a = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();
  let b = s.add_subscription(new_sub(OwnershipLevel::Client, 1)).await.unwrap();

  s.cancel(cancellation(a.id, OwnershipLevel::Profile, 7)).await.unwrap();
  // Different owner; must not match the recipient.
  s.cancel(cancellation(b.id, OwnershipLevel::Profile, 8)).await.unwrap();
  // Cross pairing: group 7 is not the recipient's group.
  s.cancel(cancellation(b.id, OwnershipLevel::Group, 7)).await.unwrap();

  let owners = OwnerList::for_recipient(&recipient());
  let found = s
    .find_by_ids_and_owners(&[a.id, b.id], &owners)
    .await
    .unwrap();
  assert_eq!(found, vec![cancellation(a.id, OwnershipLevel::Profile, 7)]);

  let none = s.find_by_ids_and_owners(&[], &owners).await.unwrap();
  assert!(none.is_empty());
}

// ─── Resolver over SQLite ────────────────────────────────────────────────────

#[tokio::test]
async fn resolver_drops_cancelled_subscriptions() {
  let s = Arc::new(store().await);
  let base = s.add_subscription(new_sub(OwnershipLevel::Base, 0)).await.unwrap();
  let group = s.add_subscription(new_sub(OwnershipLevel::Group, 3)).await.unwrap();
  let profile = s.add_subscription(new_sub(OwnershipLevel::Profile, 7)).await.unwrap();

  // Group opts out of the base subscription.
  s.cancel(cancellation(base.id, OwnershipLevel::Group, 3)).await.unwrap();

  let resolver = SubscriptionResolver::new(
    s.clone(),
    s.clone(),
    Arc::new(NotificationCatalog::with_defaults()),
  );

  let ids: Vec<_> = resolver
    .resolve_active(&recipient(), &change_password())
    .await
    .unwrap()
    .into_iter()
    .map(|sub| sub.id)
    .collect();

  assert_eq!(ids, vec![group.id, profile.id]);
}
