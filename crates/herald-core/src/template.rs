//! The [`Template`] trait, its compatibility contract, and the
//! [`TemplateRegistry`].

use std::{
  collections::BTreeMap,
  fmt,
  sync::{Arc, OnceLock},
};

use crate::{
  Error, Result,
  catalog::NotificationCatalog,
  message::Message,
  notification::{Notification, NotificationKind},
  subscription::{NotificationCode, TemplateCode},
  transport::{Transport, TransportKind},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Renders one notification kind into a [`Message`] and declares which
/// languages and transports it can serve.
///
/// Rendering must be a pure function of the notification: one instance is
/// shared by every dispatch that uses its code.
pub trait Template: Send + Sync {
  /// Name used in compatibility error messages.
  fn name(&self) -> &'static str;

  fn supported_notification(&self) -> NotificationKind;

  fn supported_languages(&self) -> &[&'static str];

  fn supported_transports(&self) -> &[TransportKind];

  fn render(&self, notification: &Notification) -> Result<Message>;

  /// True iff the notification's language is supported and its kind is the
  /// one this template renders.
  fn supports_notification(&self, notification: &Notification) -> bool {
    self.supports_language(&notification.language)
      && notification.kind() == self.supported_notification()
  }

  fn supports_transport(&self, transport: &dyn Transport) -> bool {
    self.supported_transports().contains(&transport.kind())
  }

  fn supports_language(&self, language: &str) -> bool {
    self.supported_languages().iter().any(|l| *l == language)
  }

  fn check_notification(&self, notification: &Notification) -> Result<()> {
    if !self.supports_language(&notification.language) {
      return Err(Error::IncompatibleTemplate(format!(
        "language {:?} is not supported by template [{}]",
        notification.language,
        self.name()
      )));
    }
    if notification.kind() != self.supported_notification() {
      return Err(Error::IncompatibleTemplate(format!(
        "template [{}] and notification [{}] are incompatible",
        self.name(),
        notification.kind()
      )));
    }
    Ok(())
  }

  fn check_transport(&self, transport: &dyn Transport) -> Result<()> {
    if !self.supports_transport(transport) {
      return Err(Error::IncompatibleTemplate(format!(
        "template [{}] and transport [{}] are incompatible",
        self.name(),
        transport.kind()
      )));
    }
    Ok(())
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

type TemplateFactory = Box<dyn Fn() -> Arc<dyn Template> + Send + Sync>;

struct TemplateEntry {
  description: String,
  factory:     TemplateFactory,
  instance:    OnceLock<Arc<dyn Template>>,
}

impl TemplateEntry {
  fn get(&self) -> Arc<dyn Template> {
    self.instance.get_or_init(|| (self.factory)()).clone()
  }
}

/// Maps template codes to template instances.
///
/// Instances are built on first lookup and cached for the registry's lifetime.
#[derive(Default)]
pub struct TemplateRegistry {
  entries: BTreeMap<TemplateCode, TemplateEntry>,
}

impl TemplateRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn register<F, T>(
    &mut self,
    code: TemplateCode,
    description: impl Into<String>,
    factory: F,
  ) -> Result<()>
  where
    F: Fn() -> T + Send + Sync + 'static,
    T: Template + 'static,
  {
    if self.entries.contains_key(&code) {
      return Err(Error::DuplicateOrInvalidRegistration(format!(
        "template code [{code}] is already registered"
      )));
    }

    self.entries.insert(code, TemplateEntry {
      description: description.into(),
      factory:     Box::new(move || Arc::new(factory()) as Arc<dyn Template>),
      instance:    OnceLock::new(),
    });
    Ok(())
  }

  pub fn template_by_code(&self, code: TemplateCode) -> Result<Arc<dyn Template>> {
    self
      .entries
      .get(&code)
      .map(TemplateEntry::get)
      .ok_or(Error::UnknownTemplateCode(code))
  }

  /// `code -> description` for every registered template.
  pub fn template_list(&self) -> BTreeMap<TemplateCode, String> {
    self
      .entries
      .iter()
      .map(|(code, entry)| (*code, entry.description.clone()))
      .collect()
  }

  /// `code -> description` for the templates that render the notification
  /// behind `notification_code`.
  pub fn templates_for_notification(
    &self,
    catalog: &NotificationCatalog,
    notification_code: NotificationCode,
  ) -> Result<BTreeMap<TemplateCode, String>> {
    let kind = catalog.kind_for_code(notification_code)?;

    Ok(
      self
        .entries
        .iter()
        .filter(|(_, entry)| entry.get().supported_notification() == kind)
        .map(|(code, entry)| (*code, entry.description.clone()))
        .collect(),
    )
  }
}

impl fmt::Debug for TemplateRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TemplateRegistry")
      .field("codes", &self.entries.keys().collect::<Vec<_>>())
      .finish()
  }
}
