//! Shared types and the HTTP client for the credit checkout order API.
//!
//! The `objects` and `config` modules are plain data and always available.
//! The typed [`client::OrderClient`] sits behind the `client` feature.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

pub mod config;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
