//! Configuration: an optional TOML file layered with `HERALD_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use herald_email::SmtpConfig;
use serde::Deserialize;

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/herald/herald.db") }

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// When absent, mail is logged instead of submitted.
  #[serde(default)]
  pub smtp:       Option<SmtpConfig>,
}

impl AppConfig {
  /// Read `path` (if it exists), then apply `HERALD_*` overrides. Nested keys
  /// use a double underscore, e.g. `HERALD_SMTP__HOST`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("HERALD")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let config = AppConfig::load(Path::new("/nonexistent/herald.toml")).unwrap();
    assert!(config.store_path.ends_with("herald.db"));
  }

  #[test]
  fn absolute_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("/var/herald.db")), PathBuf::from("/var/herald.db"));
  }

  #[test]
  fn tilde_is_expanded_when_home_is_set() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/h.db")), PathBuf::from(home).join("h.db"));
  }
}
