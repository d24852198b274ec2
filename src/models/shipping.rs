//! Shipping models exchanged with the checkout widget and merchant callbacks.

use serde::{Deserialize, Serialize};

use super::AccessToken;
use super::amount::Money;

/// A shipping option offered to the buyer.
///
/// `id` is optional on the wire so that malformed merchant input can be
/// reported instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tpe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

impl ShippingOption {
    /// Creates an unselected option with only an id.
    pub fn with_id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            label: None,
            selected: false,
            tpe: None,
            amount: None,
        }
    }
}

/// The buyer's shipping address as reported by the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

/// Payload of a buyer shipping-change event.
///
/// Unknown fields are kept in `extra` and handed to the merchant callback
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingChangeData {
    #[serde(rename = "orderID", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "paymentID", default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Lower-camel alias of `paymentID` kept for older integrations.
    #[serde(rename = "paymentId", default, skip_serializing_if = "Option::is_none")]
    pub payment_id_alias: Option<String>,
    #[serde(
        rename = "buyerAccessToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub buyer_access_token: Option<AccessToken>,
    #[serde(rename = "appName", default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_shipping_option: Option<ShippingOption>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ShippingChangeData {
    /// Returns the buyer access token unless it is absent or empty.
    pub fn buyer_access_token(&self) -> Option<&AccessToken> {
        self.buyer_access_token.as_ref().filter(|t| !t.is_empty())
    }
}
