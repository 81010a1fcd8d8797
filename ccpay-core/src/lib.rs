#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod purchase;
pub mod reconcile;
pub mod session;
pub mod signing;
pub mod submitter;
pub mod view;
pub mod wallet;

pub use checkout::{CheckoutConfig, CheckoutDeps, CheckoutSession};
pub use error::{CheckoutError, ErrorKind};
pub use purchase::{PurchaseFlow, PurchaseForm, PurchaseOutcome};
