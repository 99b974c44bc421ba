//! Error types for `herald-core`.

use thiserror::Error;

use crate::{
  notification::NotificationKind,
  subscription::{NotificationCode, TemplateCode, TransportCode},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("notification kind {0} is not registered")]
  UnknownNotificationKind(NotificationKind),

  #[error("notification code [{0}] is not registered")]
  UnknownNotificationCode(NotificationCode),

  #[error("template with code [{0}] is not registered")]
  UnknownTemplateCode(TemplateCode),

  #[error("transport with code [{0}] is not registered")]
  UnknownTransportCode(TransportCode),

  #[error("invalid registration: {0}")]
  DuplicateOrInvalidRegistration(String),

  #[error("incompatible template: {0}")]
  IncompatibleTemplate(String),

  #[error("invalid address: {0:?}")]
  InvalidAddress(String),

  #[error("render error: {0}")]
  Render(String),

  #[error(transparent)]
  AggregateDispatch(#[from] AggregateDispatchError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a repository error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every per-subscription failure collected during one strict dispatch.
///
/// Messages are kept in processing order and joined with newlines when
/// displayed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .failures.join("\n"))]
pub struct AggregateDispatchError {
  pub failures: Vec<String>,
}

/// A failure raised by [`Transport::send`](crate::transport::Transport::send).
///
/// Delivery is best-effort: the dispatch engine logs and reports these but
/// never counts them against the subscription.
#[derive(Debug, Error)]
#[error("delivery failed: {message}")]
pub struct DeliveryError {
  pub message: String,
  #[source]
  pub source:  Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DeliveryError {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into(), source: None }
  }

  pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self { message: message.into(), source: Some(Box::new(source)) }
  }
}
