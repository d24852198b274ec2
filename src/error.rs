//! Crate-level error types.
//!
//! [`CheckoutError`] unifies every failure the shipping-change path can
//! produce (malformed merchant input, order creation misuse, backend patch
//! failures) behind a single enum so callers can match on the variant they
//! care about while still using the `?` operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// User-facing message for any failed backend patch call.
pub const PATCH_FAILED_MESSAGE: &str = "Order could not be patched";

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Merchant-supplied data has the wrong shape (e.g. a shipping option
    /// without an id).
    #[error("{0}")]
    InvalidInput(String),

    /// A decimal amount could not be parsed.
    #[error("invalid amount for `{key}`: {value:?}")]
    InvalidAmount { key: String, value: String },

    /// `createOrder` produced an unusable order id.
    #[error("{0}")]
    CreateOrder(String),

    /// Either backend patch API rejected the update. The underlying cause is
    /// logged, never surfaced.
    #[error("Order could not be patched")]
    PatchFailed,

    /// Raw failure reported by an [`OrderApi`](crate::api::OrderApi)
    /// implementation.
    #[error("backend error: {0}")]
    Backend(String),

    /// The merchant callback or a widget invocation action failed.
    #[error("callback error: {0}")]
    Callback(String),

    /// An action was used after its shipping-change event settled.
    #[error("shipping change actions are no longer usable")]
    ActionsSettled,

    /// `order.patch` was called more than once for the same event.
    #[error("order has already been patched for this shipping change")]
    PatchAlreadySubmitted,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
