//! `herald` — manage notification subscriptions and dispatch notifications.
//!
//! # Usage
//!
//! ```
//! herald subscribe --level group --owner 3 --notification 20 --template 20 --transport 1
//! herald send --recipient '{"id":7,"group_id":3,"email":"a@example.com"}' \
//!   --notification '{"language":"en","kind":"change_password","data":{...}}'
//! ```

mod commands;
mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use herald_core::{
  catalog::NotificationCatalog,
  subscription::{
    NewSubscription, NotificationCode, OwnerId, OwnershipLevel, SubscriptionId, TemplateCode, TransportCode,
  },
  template::TemplateRegistry,
  transport::TransportRegistry,
};
use herald_email::{DryRunSender, MailSender, SenderIdentity, SmtpMailSender};
use herald_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, expand_tilde};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Herald notification router")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "herald.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Level {
  Profile,
  Group,
  Client,
  Base,
}

impl From<Level> for OwnershipLevel {
  fn from(level: Level) -> Self {
    match level {
      Level::Profile => Self::Profile,
      Level::Group => Self::Group,
      Level::Client => Self::Client,
      Level::Base => Self::Base,
    }
  }
}

#[derive(Subcommand)]
enum Command {
  /// Dispatch a notification to every active subscription of a recipient.
  Send {
    /// Recipient as JSON: `{"id", "group_id", "client_id", "email", "mobile_phone"}`.
    #[arg(long)]
    recipient:    String,
    /// Notification as JSON: `{"language", "kind", "data"}`.
    #[arg(long)]
    notification: String,
    /// Fail with every per-subscription error instead of only reporting it.
    #[arg(long)]
    strict:       bool,
  },

  /// Create a subscription.
  Subscribe {
    #[arg(long, value_enum)]
    level:        Level,
    /// Owner id; ignored for `base`.
    #[arg(long, default_value_t = 0)]
    owner:        OwnerId,
    #[arg(long)]
    notification: NotificationCode,
    #[arg(long)]
    template:     TemplateCode,
    #[arg(long)]
    transport:    TransportCode,
    /// Explicit destination instead of the recipient's own contact.
    #[arg(long)]
    address:      Option<String>,
  },

  /// Soft-remove a subscription.
  Unsubscribe { id: SubscriptionId },

  /// Opt an owner out of a subscription.
  Cancel {
    subscription: SubscriptionId,
    #[arg(long, value_enum)]
    level:        Level,
    #[arg(long, default_value_t = 0)]
    owner:        OwnerId,
  },

  /// Undo a cancellation.
  Restore {
    subscription: SubscriptionId,
    #[arg(long, value_enum)]
    level:        Level,
    #[arg(long, default_value_t = 0)]
    owner:        OwnerId,
  },

  /// List an owner's active subscriptions and cancellations.
  List {
    #[arg(long, value_enum)]
    level: Level,
    #[arg(long, default_value_t = 0)]
    owner: OwnerId,
  },

  /// List registered notification kinds.
  Notifications,

  /// List registered templates.
  Templates {
    /// Only templates rendering this notification code.
    #[arg(long)]
    notification: Option<NotificationCode>,
  },

  /// List registered transports.
  Transports,
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Everything a command needs, built once at startup.
pub struct Services {
  pub store:      Arc<SqliteStore>,
  pub catalog:    Arc<NotificationCatalog>,
  pub templates:  Arc<TemplateRegistry>,
  pub transports: Arc<TransportRegistry>,
}

fn mail_sender(config: &AppConfig) -> anyhow::Result<(Arc<dyn MailSender>, SenderIdentity)> {
  match &config.smtp {
    Some(smtp) => {
      let sender = SmtpMailSender::new(smtp)
        .with_context(|| format!("failed to configure SMTP relay {}", smtp.host))?;
      let from = SenderIdentity {
        name:    smtp.from_name.clone(),
        address: smtp.from_address.clone(),
      };
      Ok((Arc::new(sender), from))
    }
    None => {
      tracing::info!("no [smtp] section configured, mail will only be logged");
      Ok((Arc::new(DryRunSender), SenderIdentity::default()))
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let app_config = AppConfig::load(&cli.config)?;

  let store_path = expand_tilde(&app_config.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let (sender, from) = mail_sender(&app_config)?;
  let mut templates = TemplateRegistry::new();
  let mut transports = TransportRegistry::new();
  herald_email::register_defaults(&mut templates, &mut transports, sender, from)
    .context("failed to register built-in templates and transports")?;

  let services = Services {
    store:      Arc::new(store),
    catalog:    Arc::new(NotificationCatalog::with_defaults()),
    templates:  Arc::new(templates),
    transports: Arc::new(transports),
  };

  match cli.command {
    Command::Send { recipient, notification, strict } => {
      commands::send(&services, &recipient, &notification, strict).await
    }
    Command::Subscribe { level, owner, notification, template, transport, address } => {
      let input = NewSubscription {
        owner_id: owner,
        owner_type: level.into(),
        notification_code: notification,
        template_code: template,
        transport_code: transport,
        address,
      };
      commands::subscribe(&services, input).await
    }
    Command::Unsubscribe { id } => commands::unsubscribe(&services, id).await,
    Command::Cancel { subscription, level, owner } => {
      commands::cancel(&services, subscription, level.into(), owner).await
    }
    Command::Restore { subscription, level, owner } => {
      commands::restore(&services, subscription, level.into(), owner).await
    }
    Command::List { level, owner } => commands::list(&services, level.into(), owner).await,
    Command::Notifications => commands::notifications(&services),
    Command::Templates { notification } => commands::templates(&services, notification),
    Command::Transports => commands::transports(&services),
  }
}
