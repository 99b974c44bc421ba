//! Account security mails.

use herald_core::{
  Result,
  message::Message,
  notification::{Notification, NotificationKind, Payload},
  template::Template,
  transport::TransportKind,
};

use super::{escape, unsupported_language, wrong_payload};
use crate::EmailTransport;

const LANGUAGES: &[&str] = &["ru", "en"];
const TRANSPORTS: &[TransportKind] = &[EmailTransport::KIND];

/// Sends the password restore link.
pub struct RestorePasswordTemplate;

impl Template for RestorePasswordTemplate {
  fn name(&self) -> &'static str { "restore_password_email" }

  fn supported_notification(&self) -> NotificationKind { NotificationKind::RestorePassword }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::RestorePassword(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    let login = escape(&p.profile_login);
    let link = escape(&p.restore_link);

    match notification.language.as_str() {
      "ru" => Ok(Message::new(
        "Восстановление пароля",
        format!(
          "<p>Здравствуйте, {login}!</p>\
           <p>Чтобы задать новый пароль, перейдите по ссылке: \
           <a href=\"{link}\">{link}</a></p>\
           <p>Если вы не запрашивали восстановление, просто проигнорируйте это письмо.</p>"
        ),
      )),
      "en" => Ok(Message::new(
        "Password restore",
        format!(
          "<p>Hello, {login}!</p>\
           <p>To set a new password follow this link: \
           <a href=\"{link}\">{link}</a></p>\
           <p>If you did not ask for a restore, ignore this message.</p>"
        ),
      )),
      _ => Err(unsupported_language(self, notification)),
    }
  }
}

/// Tells a user that a manager changed their password.
pub struct ChangePasswordTemplate;

impl Template for ChangePasswordTemplate {
  fn name(&self) -> &'static str { "change_password_email" }

  fn supported_notification(&self) -> NotificationKind { NotificationKind::ChangePassword }

  fn supported_languages(&self) -> &[&'static str] { LANGUAGES }

  fn supported_transports(&self) -> &[TransportKind] { TRANSPORTS }

  fn render(&self, notification: &Notification) -> Result<Message> {
    let Payload::ChangePassword(p) = &notification.payload else {
      return Err(wrong_payload(self, notification));
    };
    let login = escape(&p.profile_login);
    let manager = escape(&p.manager_name);
    let manager_email = escape(&p.manager_email);

    match notification.language.as_str() {
      "ru" => Ok(Message::new(
        "Изменение пароля",
        format!(
          "<p>Здравствуйте, {login}!</p>\
           <p>Менеджер {manager} (<a href=\"mailto:{manager_email}\">{manager_email}</a>) \
           изменил пароль вашей учётной записи.</p>"
        ),
      )),
      "en" => Ok(Message::new(
        "Password change",
        format!(
          "<p>Hello, {login}!</p>\
           <p>Manager {manager} (<a href=\"mailto:{manager_email}\">{manager_email}</a>) \
           has changed the password of your account.</p>"
        ),
      )),
      _ => Err(unsupported_language(self, notification)),
    }
  }
}
