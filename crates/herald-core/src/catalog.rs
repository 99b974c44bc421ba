//! [`NotificationCatalog`] — the bijection between notification kinds and
//! their stable integer codes.

use std::collections::{BTreeMap, HashMap};

use crate::{
  Error, Result,
  notification::{Notification, NotificationKind},
  subscription::NotificationCode,
};

/// Bidirectional `code <-> kind` mapping.
///
/// Built once at startup and passed around by reference; there is no
/// mutation after construction other than through [`register`](Self::register)
/// on an owned value.
#[derive(Debug, Clone, Default)]
pub struct NotificationCatalog {
  by_code: BTreeMap<NotificationCode, NotificationKind>,
  by_kind: HashMap<NotificationKind, NotificationCode>,
}

impl NotificationCatalog {
  pub fn new() -> Self { Self::default() }

  /// The catalog of every built-in notification kind.
  pub fn with_defaults() -> Self {
    let mut catalog = Self::new();
    for (code, kind) in [
      (10, NotificationKind::RestorePassword),
      (20, NotificationKind::ChangePassword),
      (30, NotificationKind::OrderCreated),
      (40, NotificationKind::TravellerChoseApprover),
      (50, NotificationKind::ApproverConfirmedOrder),
      (60, NotificationKind::ApproverRejectedOrder),
    ] {
      let registered = catalog.register(code, kind);
      debug_assert!(registered.is_ok(), "default notification code {code} registered twice");
    }
    catalog
  }

  /// Add a `code <-> kind` pair. Fails if either side is already mapped.
  pub fn register(
    &mut self,
    code: NotificationCode,
    kind: NotificationKind,
  ) -> Result<()> {
    if let Some(existing) = self.by_code.get(&code) {
      return Err(Error::DuplicateOrInvalidRegistration(format!(
        "notification code [{code}] is already mapped to {existing}"
      )));
    }
    if let Some(existing) = self.by_kind.get(&kind) {
      return Err(Error::DuplicateOrInvalidRegistration(format!(
        "notification kind {kind} is already mapped to code [{existing}]"
      )));
    }

    self.by_code.insert(code, kind);
    self.by_kind.insert(kind, code);
    Ok(())
  }

  pub fn code_for_kind(&self, kind: NotificationKind) -> Result<NotificationCode> {
    self
      .by_kind
      .get(&kind)
      .copied()
      .ok_or(Error::UnknownNotificationKind(kind))
  }

  pub fn kind_for_code(&self, code: NotificationCode) -> Result<NotificationKind> {
    self
      .by_code
      .get(&code)
      .copied()
      .ok_or(Error::UnknownNotificationCode(code))
  }

  pub fn code_for(&self, notification: &Notification) -> Result<NotificationCode> {
    self.code_for_kind(notification.kind())
  }

  /// Every registered `(code, kind)` pair, ordered by code.
  pub fn entries(&self) -> impl Iterator<Item = (NotificationCode, NotificationKind)> + '_ {
    self.by_code.iter().map(|(code, kind)| (*code, *kind))
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn defaults_cover_every_kind() {
    let catalog = NotificationCatalog::with_defaults();
    for kind in NotificationKind::iter() {
      assert!(catalog.code_for_kind(kind).is_ok(), "{kind} has no code");
    }
    assert_eq!(catalog.entries().count(), NotificationKind::iter().count());
  }

  #[test]
  fn round_trip_for_every_registered_kind() {
    let catalog = NotificationCatalog::with_defaults();
    for (code, kind) in catalog.entries() {
      assert_eq!(catalog.code_for_kind(kind).unwrap(), code);
      assert_eq!(catalog.kind_for_code(code).unwrap(), kind);
    }
  }

  #[test]
  fn stable_codes() {
    let catalog = NotificationCatalog::with_defaults();
    assert_eq!(catalog.code_for_kind(NotificationKind::RestorePassword).unwrap(), 10);
    assert_eq!(catalog.code_for_kind(NotificationKind::ChangePassword).unwrap(), 20);
    assert_eq!(
      catalog.kind_for_code(60).unwrap(),
      NotificationKind::ApproverRejectedOrder
    );
  }

  #[test]
  fn unknown_code_fails() {
    let catalog = NotificationCatalog::with_defaults();
    let err = catalog.kind_for_code(11).unwrap_err();
    assert!(matches!(err, Error::UnknownNotificationCode(11)));
    assert_eq!(err.to_string(), "notification code [11] is not registered");
  }

  #[test]
  fn unknown_kind_fails() {
    let catalog = NotificationCatalog::new();
    assert!(matches!(
      catalog.code_for_kind(NotificationKind::OrderCreated),
      Err(Error::UnknownNotificationKind(NotificationKind::OrderCreated))
    ));
  }

  #[test]
  fn duplicate_code_or_kind_is_rejected() {
    let mut catalog = NotificationCatalog::new();
    catalog.register(10, NotificationKind::RestorePassword).unwrap();

    assert!(matches!(
      catalog.register(10, NotificationKind::ChangePassword),
      Err(Error::DuplicateOrInvalidRegistration(_))
    ));
    assert!(matches!(
      catalog.register(11, NotificationKind::RestorePassword),
      Err(Error::DuplicateOrInvalidRegistration(_))
    ));
    // The failed registrations left the bijection intact.
    assert_eq!(catalog.entries().count(), 1);
  }
}
