//! Monetary amount models.
//!
//! A [`Breakdown`] itemizes the components of an order total. Values stay
//! decimal strings on the wire and are only parsed into
//! [`Decimal`](rust_decimal::Decimal) when totals are recomputed.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CheckoutError, Result};

/// Keys of an amount breakdown, ordered as the backend lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKey {
    ItemTotal,
    Shipping,
    Handling,
    TaxTotal,
    Insurance,
    ShippingDiscount,
    Discount,
}

impl BreakdownKey {
    /// Returns the wire-format key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakdownKey::ItemTotal => "item_total",
            BreakdownKey::Shipping => "shipping",
            BreakdownKey::Handling => "handling",
            BreakdownKey::TaxTotal => "tax_total",
            BreakdownKey::Insurance => "insurance",
            BreakdownKey::ShippingDiscount => "shipping_discount",
            BreakdownKey::Discount => "discount",
        }
    }

    /// Discount keys reduce the total by the magnitude of their value.
    pub fn is_discount(&self) -> bool {
        matches!(self, BreakdownKey::ShippingDiscount | BreakdownKey::Discount)
    }
}

/// A currency amount as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

impl Money {
    pub fn new(currency_code: &str, value: &str) -> Self {
        Self {
            currency_code: currency_code.to_string(),
            value: value.to_string(),
        }
    }
}

/// Itemized amount components keyed by [`BreakdownKey`].
pub type Breakdown = BTreeMap<BreakdownKey, Money>;

/// Merchant-supplied replacement amounts. `None` means "no change".
pub type UpdatedAmounts = BTreeMap<BreakdownKey, Option<String>>;

/// Parses a decimal amount, attributing failures to `key`.
pub(crate) fn parse_amount(key: BreakdownKey, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| CheckoutError::InvalidAmount {
        key: key.as_str().to_string(),
        value: value.to_string(),
    })
}
