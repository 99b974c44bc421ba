//! Subcommand implementations. Every command prints its result to stdout as
//! pretty JSON; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context as _, bail};
use herald_core::{
  dispatch::DispatchEngine,
  notification::Notification,
  recipient::Contact,
  report::TracingReporter,
  resolver::SubscriptionResolver,
  subscription::{
    NewSubscription, NotificationCode, OwnerId, OwnershipLevel, SubscriptionCancellation,
    SubscriptionId,
  },
};
use serde::Serialize;
use serde_json::json;

use crate::Services;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn send(
  services: &Services,
  recipient: &str,
  notification: &str,
  strict: bool,
) -> anyhow::Result<()> {
  let recipient: Contact =
    serde_json::from_str(recipient).context("failed to parse recipient JSON")?;
  let notification: Notification =
    serde_json::from_str(notification).context("failed to parse notification JSON")?;

  let resolver = SubscriptionResolver::new(
    services.store.clone(),
    services.store.clone(),
    services.catalog.clone(),
  );
  let engine = DispatchEngine::new(
    resolver,
    services.templates.clone(),
    services.transports.clone(),
    Arc::new(TracingReporter),
  );

  if strict {
    let report = engine
      .dispatch(&recipient, &notification)
      .await
      .context("dispatch failed")?;
    print_json(&report)
  } else {
    let report = engine
      .dispatch_lenient(&recipient, &notification)
      .await
      .context("dispatch failed")?;
    print_json(&report)
  }
}

// ─── Subscriptions ────────────────────────────────────────────────────────────

/// Create a subscription after checking that its codes are registered and fit
/// together.
pub async fn subscribe(services: &Services, input: NewSubscription) -> anyhow::Result<()> {
  let kind = services.catalog.kind_for_code(input.notification_code)?;
  let template = services.templates.template_by_code(input.template_code)?;
  let transport = services.transports.transport_by_code(input.transport_code)?;

  if template.supported_notification() != kind {
    bail!(
      "template [{}] does not render notification [{}]",
      input.template_code,
      kind
    );
  }
  template.check_transport(&*transport)?;

  if let Some(address) = input.address.as_deref().filter(|a| !a.trim().is_empty())
    && !transport.is_valid_address(address.trim())
  {
    bail!("address {address:?} is not valid for transport [{}]", transport.kind());
  }

  let subscription = services.store.add_subscription(input).await?;
  print_json(&subscription)
}

pub async fn unsubscribe(services: &Services, id: SubscriptionId) -> anyhow::Result<()> {
  let subscription = services.store.soft_remove(id).await?;
  print_json(&subscription)
}

pub async fn cancel(
  services: &Services,
  subscription_id: SubscriptionId,
  level: OwnershipLevel,
  owner_id: OwnerId,
) -> anyhow::Result<()> {
  let cancellation = services
    .store
    .cancel(SubscriptionCancellation { owner_id, owner_type: level, subscription_id })
    .await?;
  print_json(&cancellation)
}

pub async fn restore(
  services: &Services,
  subscription_id: SubscriptionId,
  level: OwnershipLevel,
  owner_id: OwnerId,
) -> anyhow::Result<()> {
  services.store.restore(subscription_id, level, owner_id).await?;
  print_json(&json!({ "restored": subscription_id }))
}

pub async fn list(
  services: &Services,
  level: OwnershipLevel,
  owner_id: OwnerId,
) -> anyhow::Result<()> {
  let subscriptions = services.store.find_by_owner(level, owner_id).await?;
  let cancellations = services
    .store
    .find_cancellations_by_owner(level, owner_id)
    .await?;
  print_json(&json!({
    "subscriptions": subscriptions,
    "cancellations": cancellations,
  }))
}

// ─── Registries ───────────────────────────────────────────────────────────────

pub fn notifications(services: &Services) -> anyhow::Result<()> {
  let entries: Vec<_> = services
    .catalog
    .entries()
    .map(|(code, kind)| json!({ "code": code, "kind": kind, "title": kind.title() }))
    .collect();
  print_json(&entries)
}

pub fn templates(
  services: &Services,
  notification: Option<NotificationCode>,
) -> anyhow::Result<()> {
  let list = match notification {
    Some(code) => services
      .templates
      .templates_for_notification(&services.catalog, code)?,
    None => services.templates.template_list(),
  };
  print_json(&list)
}

pub fn transports(services: &Services) -> anyhow::Result<()> {
  print_json(&services.transports.transport_list())
}
