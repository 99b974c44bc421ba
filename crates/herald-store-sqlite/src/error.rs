//! Error type for `herald-store-sqlite`.

use herald_core::subscription::{OwnerId, OwnershipLevel, SubscriptionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A column held a value that does not map back to a domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("subscription not found: {0}")]
  SubscriptionNotFound(SubscriptionId),

  #[error("subscription {0} is already removed")]
  AlreadyRemoved(SubscriptionId),

  #[error("subscription {subscription_id} is already cancelled by {owner_type:?} {owner_id}")]
  AlreadyCancelled {
    subscription_id: SubscriptionId,
    owner_type:      OwnershipLevel,
    owner_id:        OwnerId,
  },

  #[error("no cancellation of subscription {subscription_id} by {owner_type:?} {owner_id}")]
  CancellationNotFound {
    subscription_id: SubscriptionId,
    owner_type:      OwnershipLevel,
    owner_id:        OwnerId,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
