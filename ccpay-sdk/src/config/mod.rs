//! Static description of the network payments are made on.
//!
//! The chain configuration is built once at startup (from defaults or a
//! config file) and shared read-only behind an `Arc`.

mod chain;

pub use chain::{ChainConfig, GasPriceStep};
