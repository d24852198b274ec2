//! Shipping-change callback engine for embedded checkout.
//!
//! When a buyer changes their shipping address or option, the merchant's
//! callback receives a scoped set of actions, builds a patch (recomputing the
//! amount breakdown where needed), and submits it to either the generic order
//! patch API or the dedicated shipping patch API.

pub mod api;
pub mod breakdown;
pub mod config;
pub mod error;
pub mod models;
pub mod order;
pub mod patch;
pub mod shipping;
pub mod validate;

pub use error::{CheckoutError, PATCH_FAILED_MESSAGE, Result};
