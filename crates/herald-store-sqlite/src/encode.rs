//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! lowercase text.

use chrono::{DateTime, Utc};
use herald_core::subscription::{
  OwnershipLevel, Subscription, SubscriptionCancellation, SubscriptionStatus,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── OwnershipLevel ──────────────────────────────────────────────────────────

pub fn encode_level(level: OwnershipLevel) -> &'static str {
  match level {
    OwnershipLevel::Profile => "profile",
    OwnershipLevel::Group => "group",
    OwnershipLevel::Client => "client",
    OwnershipLevel::Base => "base",
  }
}

pub fn decode_level(s: &str) -> Result<OwnershipLevel> {
  match s {
    "profile" => Ok(OwnershipLevel::Profile),
    "group" => Ok(OwnershipLevel::Group),
    "client" => Ok(OwnershipLevel::Client),
    "base" => Ok(OwnershipLevel::Base),
    other => Err(Error::Decode(format!("unknown ownership level: {other:?}"))),
  }
}

// ─── SubscriptionStatus ──────────────────────────────────────────────────────

pub fn encode_status(status: SubscriptionStatus) -> &'static str {
  match status {
    SubscriptionStatus::Active => "active",
    SubscriptionStatus::Removed => "removed",
  }
}

pub fn decode_status(s: &str) -> Result<SubscriptionStatus> {
  match s {
    "active" => Ok(SubscriptionStatus::Active),
    "removed" => Ok(SubscriptionStatus::Removed),
    other => Err(Error::Decode(format!("unknown subscription status: {other:?}"))),
  }
}

// ─── Codes ───────────────────────────────────────────────────────────────────

fn decode_code(column: &str, value: i64) -> Result<u32> {
  u32::try_from(value)
    .map_err(|_| Error::Decode(format!("{column} out of range: {value}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSubscription::from_row`].
pub const SUBSCRIPTION_COLUMNS: &str = "id, owner_id, owner_type, notification_code, \
                                        template_code, transport_code, address, status";

/// Raw values read directly from a `subscriptions` row.
pub struct RawSubscription {
  pub id:                i64,
  pub owner_id:          i64,
  pub owner_type:        String,
  pub notification_code: i64,
  pub template_code:     i64,
  pub transport_code:    i64,
  pub address:           Option<String>,
  pub status:            String,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      owner_id:          row.get(1)?,
      owner_type:        row.get(2)?,
      notification_code: row.get(3)?,
      template_code:     row.get(4)?,
      transport_code:    row.get(5)?,
      address:           row.get(6)?,
      status:            row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:                self.id,
      owner_id:          self.owner_id,
      owner_type:        decode_level(&self.owner_type)?,
      notification_code: decode_code("notification_code", self.notification_code)?,
      template_code:     decode_code("template_code", self.template_code)?,
      transport_code:    decode_code("transport_code", self.transport_code)?,
      address:           self.address,
      status:            decode_status(&self.status)?,
    })
  }
}

/// Column list matching [`RawCancellation::from_row`].
pub const CANCELLATION_COLUMNS: &str = "subscription_id, owner_id, owner_type";

/// Raw values read directly from a `subscription_cancellations` row.
pub struct RawCancellation {
  pub subscription_id: i64,
  pub owner_id:        i64,
  pub owner_type:      String,
}

impl RawCancellation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subscription_id: row.get(0)?,
      owner_id:        row.get(1)?,
      owner_type:      row.get(2)?,
    })
  }

  pub fn into_cancellation(self) -> Result<SubscriptionCancellation> {
    Ok(SubscriptionCancellation {
      subscription_id: self.subscription_id,
      owner_id:        self.owner_id,
      owner_type:      decode_level(&self.owner_type)?,
    })
  }
}
