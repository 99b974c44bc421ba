//! Core types and trait definitions for the Herald notification router.
//!
//! This crate is deliberately free of database and SMTP dependencies.
//! Storage backends implement the repository traits in [`store`]; concrete
//! transports and templates implement [`transport::Transport`] and
//! [`template::Template`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod notification;
pub mod recipient;
pub mod report;
pub mod resolver;
pub mod store;
pub mod subscription;
pub mod template;
pub mod transport;

pub use error::{AggregateDispatchError, DeliveryError, Error, Result};
