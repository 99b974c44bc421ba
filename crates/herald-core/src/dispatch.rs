//! [`DispatchEngine`] — fans one notification out over every active
//! subscription of a recipient.
//!
//! Each subscription goes through
//! `resolved → template loaded → transport loaded → compatibility checked →
//! rendered → address resolved → delivered | delivery failed`.
//! Any failure before delivery aborts that subscription only; delivery
//! failures are logged and reported, never escalated.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  AggregateDispatchError, Error, Result,
  notification::Notification,
  recipient::Recipient,
  report::ErrorReporter,
  resolver::SubscriptionResolver,
  store::{CancellationStore, SubscriptionStore},
  subscription::Subscription,
  template::TemplateRegistry,
  transport::TransportRegistry,
};

/// Terminal state of one subscription that made it to the send step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
  Delivered,
  /// The transport raised; the failure was logged and reported.
  DeliveryFailed,
}

/// Summary of a successful (strict) dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
  /// Active subscriptions after cancellation filtering.
  pub resolved:          usize,
  pub delivered:         usize,
  /// Sends that raised and were swallowed.
  pub delivery_failures: usize,
}

pub struct DispatchEngine<S, C> {
  resolver:   SubscriptionResolver<S, C>,
  templates:  Arc<TemplateRegistry>,
  transports: Arc<TransportRegistry>,
  reporter:   Arc<dyn ErrorReporter>,
}

impl<S, C> DispatchEngine<S, C>
where
  S: SubscriptionStore,
  C: CancellationStore,
{
  pub fn new(
    resolver: SubscriptionResolver<S, C>,
    templates: Arc<TemplateRegistry>,
    transports: Arc<TransportRegistry>,
    reporter: Arc<dyn ErrorReporter>,
  ) -> Self {
    Self { resolver, templates, transports, reporter }
  }

  pub fn resolver(&self) -> &SubscriptionResolver<S, C> { &self.resolver }

  /// Route `notification` through a single subscription.
  ///
  /// Lookup, compatibility, render and address failures are returned.
  /// A failing send is not: it yields [`DeliveryOutcome::DeliveryFailed`].
  pub async fn dispatch_one(
    &self,
    recipient: &dyn Recipient,
    notification: &Notification,
    subscription: &Subscription,
  ) -> Result<DeliveryOutcome> {
    tracing::debug!(
      subscription_id = subscription.id,
      recipient = recipient.id(),
      kind = %notification.kind(),
      "processing subscription"
    );

    let template = self.templates.template_by_code(subscription.template_code)?;
    let mut transport = self.transports.transport_by_code(subscription.transport_code)?;

    template.check_notification(notification)?;
    template.check_transport(&*transport)?;

    let message = template.render(notification)?;

    match subscription.address_override() {
      Some(address) => {
        transport.set_address(address)?;
        tracing::debug!(
          subscription_id = subscription.id,
          address = transport.address(),
          "address taken from subscription"
        );
      }
      None => {
        transport.set_address_from_recipient(recipient)?;
        tracing::debug!(
          subscription_id = subscription.id,
          address = transport.address(),
          "address taken from recipient"
        );
      }
    }

    match transport.send(&message).await {
      Ok(()) => {
        tracing::info!(
          subscription_id = subscription.id,
          transport = %transport.kind(),
          address = transport.address(),
          "notification delivered"
        );
        Ok(DeliveryOutcome::Delivered)
      }
      Err(err) => {
        tracing::warn!(
          subscription_id = subscription.id,
          transport = %transport.kind(),
          error = %err,
          "delivery failed"
        );
        self.reporter.capture(&err);
        Ok(DeliveryOutcome::DeliveryFailed)
      }
    }
  }

  /// Dispatch to every active subscription, then fail if any of them failed.
  ///
  /// Subscriptions are processed one at a time and a failing subscription
  /// never stops the rest. Resolution failures (unknown notification kind,
  /// repository errors) are returned as-is, before any subscription runs.
  pub async fn dispatch(
    &self,
    recipient: &dyn Recipient,
    notification: &Notification,
  ) -> Result<DispatchReport> {
    tracing::debug!(
      recipient = recipient.id(),
      kind = %notification.kind(),
      "dispatch requested"
    );

    let active = self.resolver.resolve_active(recipient, notification).await?;

    if active.is_empty() {
      tracing::debug!(
        recipient = recipient.id(),
        kind = %notification.kind(),
        "recipient has no active subscriptions"
      );
    }

    let mut report = DispatchReport { resolved: active.len(), ..Default::default() };
    let mut failures = Vec::new();

    for subscription in &active {
      match self.dispatch_one(recipient, notification, subscription).await {
        Ok(DeliveryOutcome::Delivered) => report.delivered += 1,
        Ok(DeliveryOutcome::DeliveryFailed) => report.delivery_failures += 1,
        Err(err) => {
          tracing::warn!(
            subscription_id = subscription.id,
            error = %err,
            "subscription aborted"
          );
          failures.push(format!("subscription [{}]: {err}", subscription.id));
        }
      }
    }

    if !failures.is_empty() {
      return Err(AggregateDispatchError { failures }.into());
    }

    Ok(report)
  }

  /// [`dispatch`](Self::dispatch), with per-subscription failures handed to
  /// the reporter instead of the caller.
  ///
  /// Returns `Ok(None)` when the aggregate error was absorbed. Resolution
  /// failures (unknown notification kind, repository errors) still propagate.
  pub async fn dispatch_lenient(
    &self,
    recipient: &dyn Recipient,
    notification: &Notification,
  ) -> Result<Option<DispatchReport>> {
    match self.dispatch(recipient, notification).await {
      Ok(report) => Ok(Some(report)),
      Err(Error::AggregateDispatch(err)) => {
        self.reporter.capture(&err);
        Ok(None)
      }
      Err(err) => Err(err),
    }
  }
}
