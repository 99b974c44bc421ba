//! [`SqliteStore`] — the SQLite implementation of [`SubscriptionStore`] and
//! [`CancellationStore`], plus subscription management.

use std::path::Path;

use chrono::Utc;
use herald_core::{
  store::{CancellationStore, SubscriptionStore},
  subscription::{
    NewSubscription, NotificationCode, Owner, OwnerId, OwnerList, OwnershipLevel,
    Subscription, SubscriptionCancellation, SubscriptionId, SubscriptionStatus,
  },
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  Error, Result,
  encode::{
    CANCELLATION_COLUMNS, RawCancellation, RawSubscription, SUBSCRIPTION_COLUMNS,
    encode_dt, encode_level, encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Subscription and cancellation repositories backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// `(owner_type = ? AND owner_id = ?) OR ...` for every entry of `owners`,
/// pushing the matching parameters onto `params`.
fn owner_clause(owners: &OwnerList, params: &mut Vec<Value>) -> String {
  owners
    .owners()
    .iter()
    .map(|owner| {
      params.push(Value::Text(encode_level(owner.level).to_owned()));
      params.push(Value::Integer(owner.id));
      "(owner_type = ? AND owner_id = ?)"
    })
    .collect::<Vec<_>>()
    .join(" OR ")
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  /// Persist a new, active subscription. Base-level subscriptions are always
  /// stored with owner id 0; a blank address is stored as no address.
  pub async fn add_subscription(&self, input: NewSubscription) -> Result<Subscription> {
    let owner   = Owner::new(input.owner_type, input.owner_id);
    let address = input
      .address
      .map(|a| a.trim().to_owned())
      .filter(|a| !a.is_empty());

    let level_str   = encode_level(owner.level);
    let status_str  = encode_status(SubscriptionStatus::Active);
    let created_str = encode_dt(Utc::now());
    let address_col = address.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             owner_id, owner_type, notification_code, template_code,
             transport_code, address, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            owner.id,
            level_str,
            input.notification_code,
            input.template_code,
            input.transport_code,
            address_col,
            status_str,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(
      subscription_id = id,
      owner_type = level_str,
      owner_id = owner.id,
      notification_code = input.notification_code,
      "subscription added"
    );

    Ok(Subscription {
      id,
      owner_id: owner.id,
      owner_type: owner.level,
      notification_code: input.notification_code,
      template_code: input.template_code,
      transport_code: input.transport_code,
      address,
      status: SubscriptionStatus::Active,
    })
  }

  /// Retrieve a subscription regardless of status. Returns `None` if missing.
  pub async fn get_subscription(&self, id: SubscriptionId) -> Result<Option<Subscription>> {
    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?1"),
              rusqlite::params![id],
              RawSubscription::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  /// Mark a subscription as removed. The row is kept; it simply stops
  /// matching dispatch queries.
  pub async fn soft_remove(&self, id: SubscriptionId) -> Result<Subscription> {
    let subscription = self
      .get_subscription(id)
      .await?
      .ok_or(Error::SubscriptionNotFound(id))?;

    if !subscription.status.is_active() {
      return Err(Error::AlreadyRemoved(id));
    }

    let status_str = encode_status(SubscriptionStatus::Removed);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE subscriptions SET status = ?1 WHERE id = ?2",
          rusqlite::params![status_str, id],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(subscription_id = id, "subscription removed");

    Ok(Subscription { status: SubscriptionStatus::Removed, ..subscription })
  }

  /// Active subscriptions anchored at exactly one `(level, owner)`.
  pub async fn find_by_owner(
    &self,
    level: OwnershipLevel,
    owner_id: OwnerId,
  ) -> Result<Vec<Subscription>> {
    let owner      = Owner::new(level, owner_id);
    let level_str  = encode_level(owner.level);
    let status_str = encode_status(SubscriptionStatus::Active);

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
           WHERE owner_type = ?1 AND owner_id = ?2 AND status = ?3
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![level_str, owner.id, status_str],
            RawSubscription::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  // ── Cancellations ─────────────────────────────────────────────────────────

  /// Record that `cancellation.owner` opts out of a subscription.
  pub async fn cancel(
    &self,
    cancellation: SubscriptionCancellation,
  ) -> Result<SubscriptionCancellation> {
    let owner = Owner::new(cancellation.owner_type, cancellation.owner_id);
    let subscription_id = cancellation.subscription_id;

    if self.get_subscription(subscription_id).await?.is_none() {
      return Err(Error::SubscriptionNotFound(subscription_id));
    }

    let level_str = encode_level(owner.level);
    let at_str    = encode_dt(Utc::now());

    // The primary key decides between concurrent cancels of the same pair.
    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO subscription_cancellations
             (subscription_id, owner_id, owner_type, recorded_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT DO NOTHING",
          rusqlite::params![subscription_id, owner.id, level_str, at_str],
        )?;
        Ok(n)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::AlreadyCancelled {
        subscription_id,
        owner_type: owner.level,
        owner_id: owner.id,
      });
    }

    tracing::debug!(
      subscription_id,
      owner_type = level_str,
      owner_id = owner.id,
      "subscription cancelled"
    );

    Ok(SubscriptionCancellation {
      owner_id: owner.id,
      owner_type: owner.level,
      subscription_id,
    })
  }

  /// Delete a cancellation, re-enabling the subscription for that owner.
  pub async fn restore(
    &self,
    subscription_id: SubscriptionId,
    level: OwnershipLevel,
    owner_id: OwnerId,
  ) -> Result<()> {
    let owner     = Owner::new(level, owner_id);
    let level_str = encode_level(owner.level);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscription_cancellations
           WHERE subscription_id = ?1 AND owner_type = ?2 AND owner_id = ?3",
          rusqlite::params![subscription_id, level_str, owner.id],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::CancellationNotFound {
        subscription_id,
        owner_type: owner.level,
        owner_id: owner.id,
      });
    }
    Ok(())
  }

  /// Every cancellation recorded by one owner.
  pub async fn find_cancellations_by_owner(
    &self,
    level: OwnershipLevel,
    owner_id: OwnerId,
  ) -> Result<Vec<SubscriptionCancellation>> {
    let owner     = Owner::new(level, owner_id);
    let level_str = encode_level(owner.level);

    let raws: Vec<RawCancellation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CANCELLATION_COLUMNS} FROM subscription_cancellations
           WHERE owner_type = ?1 AND owner_id = ?2
           ORDER BY subscription_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![level_str, owner.id], RawCancellation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCancellation::into_cancellation).collect()
  }

  /// The cancellation of one subscription by one owner, if recorded.
  pub async fn find_cancellation_for_owner(
    &self,
    subscription_id: SubscriptionId,
    level: OwnershipLevel,
    owner_id: OwnerId,
  ) -> Result<Option<SubscriptionCancellation>> {
    let owner     = Owner::new(level, owner_id);
    let level_str = encode_level(owner.level);

    let raw: Option<RawCancellation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CANCELLATION_COLUMNS} FROM subscription_cancellations
                 WHERE subscription_id = ?1 AND owner_type = ?2 AND owner_id = ?3"
              ),
              rusqlite::params![subscription_id, level_str, owner.id],
              RawCancellation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCancellation::into_cancellation).transpose()
  }
}

// ─── Repository trait impls ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn find_active_by_notification_and_owners(
    &self,
    notification_code: NotificationCode,
    owners: &OwnerList,
  ) -> Result<Vec<Subscription>> {
    if owners.owners().is_empty() {
      return Ok(Vec::new());
    }

    let mut params = vec![
      Value::Integer(i64::from(notification_code)),
      Value::Text(encode_status(SubscriptionStatus::Active).to_owned()),
    ];
    let owners_sql = owner_clause(owners, &mut params);

    let sql = format!(
      "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions
       WHERE notification_code = ? AND status = ? AND ({owners_sql})
       ORDER BY id"
    );

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }
}

impl CancellationStore for SqliteStore {
  type Error = Error;

  async fn find_by_ids_and_owners(
    &self,
    subscription_ids: &[SubscriptionId],
    owners: &OwnerList,
  ) -> Result<Vec<SubscriptionCancellation>> {
    if subscription_ids.is_empty() || owners.owners().is_empty() {
      return Ok(Vec::new());
    }

    let mut params: Vec<Value> =
      subscription_ids.iter().map(|id| Value::Integer(*id)).collect();
    let ids_sql    = vec!["?"; subscription_ids.len()].join(", ");
    let owners_sql = owner_clause(owners, &mut params);

    let sql = format!(
      "SELECT {CANCELLATION_COLUMNS} FROM subscription_cancellations
       WHERE subscription_id IN ({ids_sql}) AND ({owners_sql})
       ORDER BY subscription_id"
    );

    let raws: Vec<RawCancellation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCancellation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCancellation::into_cancellation).collect()
  }
}
