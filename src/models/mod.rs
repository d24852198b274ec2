//! Shared models for the shipping-change patch flow.
//!
//! Contains the patch operation types sent to the order backend, the
//! path categories a shipping change may touch, and a redacting wrapper
//! for access tokens.

pub mod amount;
pub mod shipping;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use amount::{Breakdown, BreakdownKey, Money, UpdatedAmounts};
pub use shipping::{ShippingAddress, ShippingChangeData, ShippingOption};

/// Reference id used when the merchant does not name a purchase unit.
pub const DEFAULT_REFERENCE_ID: &str = "default";

/// Parts of a purchase unit a shipping change is allowed to patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathCategory {
    Amount,
    ShippingAddress,
    ShippingOptions,
}

impl PathCategory {
    /// Returns the path suffix appended after the purchase unit selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathCategory::Amount => "amount",
            PathCategory::ShippingAddress => "shipping/address",
            PathCategory::ShippingOptions => "shipping/options",
        }
    }

    /// Builds the full patch path for the given purchase unit reference id.
    pub fn path(&self, reference_id: &str) -> String {
        format!(
            "/purchase_units/@reference_id=='{reference_id}'/{}",
            self.as_str()
        )
    }
}

/// Patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
    Add,
}

/// A single patch instruction targeting one path of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub op: PatchOp,
    pub path: String,
    pub value: serde_json::Value,
}

impl Query {
    /// Creates a query for `category` on the given purchase unit.
    pub fn new(
        op: PatchOp,
        category: PathCategory,
        reference_id: &str,
        value: serde_json::Value,
    ) -> Self {
        Self {
            op,
            path: category.path(reference_id),
            value,
        }
    }
}

/// An access token that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in backend calls.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}
