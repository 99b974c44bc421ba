//! The [`Transport`] trait and the [`TransportRegistry`] factory table.
//!
//! A transport accumulates per-send state (the destination address), so the
//! registry hands out a freshly constructed instance on every lookup. Two
//! dispatches never share a transport.

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;

use crate::{
  DeliveryError, Error, Result,
  message::Message,
  recipient::Recipient,
  subscription::TransportCode,
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Identity of a transport implementation, used by templates to declare which
/// transports they can be delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportKind(&'static str);

impl TransportKind {
  pub const fn new(name: &'static str) -> Self { Self(name) }

  pub fn name(&self) -> &'static str { self.0 }
}

impl fmt::Display for TransportKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.0) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Delivers a rendered [`Message`] to one resolved address.
#[async_trait]
pub trait Transport: Send {
  fn kind(&self) -> TransportKind;

  /// Whether `address` is usable by this transport.
  fn is_valid_address(&self, address: &str) -> bool;

  /// Use an explicit destination (a subscription's address override).
  ///
  /// Fails with [`Error::InvalidAddress`] if the address is not usable.
  fn set_address(&mut self, address: &str) -> Result<()>;

  /// Derive the destination from the recipient's contact fields.
  ///
  /// Fails with [`Error::InvalidAddress`] if the recipient has no usable
  /// contact for this transport.
  fn set_address_from_recipient(&mut self, recipient: &dyn Recipient) -> Result<()>;

  fn address(&self) -> Option<&str>;

  /// Hand the message to the underlying delivery mechanism.
  async fn send(&mut self, message: &Message) -> Result<(), DeliveryError>;
}

// ─── Registry ────────────────────────────────────────────────────────────────

type TransportFactory = Box<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

struct TransportEntry {
  description: String,
  factory:     TransportFactory,
}

/// Maps transport codes to factories. Built at startup, read-only afterwards.
#[derive(Default)]
pub struct TransportRegistry {
  entries: BTreeMap<TransportCode, TransportEntry>,
}

impl TransportRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register a factory under `code`.
  ///
  /// The factory's return type must implement [`Transport`], so the only
  /// runtime failure is a code that is already taken.
  pub fn register<F, T>(
    &mut self,
    code: TransportCode,
    description: impl Into<String>,
    factory: F,
  ) -> Result<()>
  where
    F: Fn() -> T + Send + Sync + 'static,
    T: Transport + 'static,
  {
    if self.entries.contains_key(&code) {
      return Err(Error::DuplicateOrInvalidRegistration(format!(
        "transport code [{code}] is already registered"
      )));
    }

    self.entries.insert(code, TransportEntry {
      description: description.into(),
      factory:     Box::new(move || Box::new(factory()) as Box<dyn Transport>),
    });
    Ok(())
  }

  /// Build a new transport instance for `code`.
  pub fn transport_by_code(&self, code: TransportCode) -> Result<Box<dyn Transport>> {
    let entry = self
      .entries
      .get(&code)
      .ok_or(Error::UnknownTransportCode(code))?;
    Ok((entry.factory)())
  }

  /// `code -> description` for every registered transport.
  pub fn transport_list(&self) -> BTreeMap<TransportCode, String> {
    self
      .entries
      .iter()
      .map(|(code, entry)| (*code, entry.description.clone()))
      .collect()
  }
}

impl fmt::Debug for TransportRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TransportRegistry")
      .field("codes", &self.entries.keys().collect::<Vec<_>>())
      .finish()
  }
}
