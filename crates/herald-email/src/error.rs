//! Error type for `herald-email`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("smtp error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  #[error("address error: {0}")]
  Address(#[from] lettre::address::AddressError),

  /// The MIME message could not be assembled.
  #[error("message build error: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("invalid content type {0:?}")]
  ContentType(String),

  #[error("cannot read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
