//! Built-in HTML email templates.

mod account;
mod order;

use herald_core::{
  Error, Result,
  notification::Notification,
  subscription::TemplateCode,
  template::{Template, TemplateRegistry},
};

pub use self::{
  account::{ChangePasswordTemplate, RestorePasswordTemplate},
  order::{
    ApproverConfirmedOrderTemplate, ApproverRejectedOrderTemplate, OrderCreatedTemplate,
    TravellerChoseApproverTemplate,
  },
};

pub const RESTORE_PASSWORD: TemplateCode = 10;
pub const CHANGE_PASSWORD: TemplateCode = 20;
pub const ORDER_CREATED: TemplateCode = 31;
pub const TRAVELLER_CHOSE_APPROVER: TemplateCode = 41;
pub const APPROVER_CONFIRMED_ORDER: TemplateCode = 51;
pub const APPROVER_REJECTED_ORDER: TemplateCode = 61;

/// Install every built-in template under its stable code.
pub fn register(registry: &mut TemplateRegistry) -> Result<()> {
  registry.register(RESTORE_PASSWORD, "Password restore (email)", || RestorePasswordTemplate)?;
  registry.register(CHANGE_PASSWORD, "Password change (email)", || ChangePasswordTemplate)?;
  registry.register(ORDER_CREATED, "Order created (email)", || OrderCreatedTemplate)?;
  registry.register(
    TRAVELLER_CHOSE_APPROVER,
    "Approval requested (email)",
    || TravellerChoseApproverTemplate,
  )?;
  registry.register(
    APPROVER_CONFIRMED_ORDER,
    "Order approved (email)",
    || ApproverConfirmedOrderTemplate,
  )?;
  registry.register(
    APPROVER_REJECTED_ORDER,
    "Order rejected (email)",
    || ApproverRejectedOrderTemplate,
  )?;
  Ok(())
}

// ─── Rendering helpers ───────────────────────────────────────────────────────

/// Minimal HTML escaping for values interpolated into a body.
fn escape(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// Error for a payload that does not belong to the template rendering it.
fn wrong_payload(template: &dyn Template, notification: &Notification) -> Error {
  Error::Render(format!(
    "template [{}] cannot render notification [{}]",
    template.name(),
    notification.kind()
  ))
}

fn unsupported_language(template: &dyn Template, notification: &Notification) -> Error {
  Error::Render(format!(
    "template [{}] has no {:?} translation",
    template.name(),
    notification.language
  ))
}
