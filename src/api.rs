//! Backend order update APIs.
//!
//! The transport lives outside this crate; implementors of [`OrderApi`]
//! perform the actual calls. Both operations mutate the order, so callers
//! must issue each at most once per shipping change.

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;
use crate::models::AccessToken;

/// Options for the generic order patch call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOrderOptions {
    pub facilitator_access_token: AccessToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_access_token: Option<AccessToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_attribution_id: Option<String>,
    /// Forces the REST order API instead of the default gateway.
    #[serde(rename = "forceRestAPI")]
    pub force_rest_api: bool,
}

/// Request body for the dedicated shipping patch call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchShippingRequest {
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub data: serde_json::Value,
    #[serde(rename = "orderID")]
    pub order_id: String,
}

/// The two backend calls a shipping change can end in.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Applies `data` to the order through the generic order patch API.
    async fn patch_order(
        &self,
        order_id: &str,
        data: &serde_json::Value,
        options: &PatchOrderOptions,
    ) -> Result<serde_json::Value>;

    /// Applies `request.data` through the dedicated shipping patch API.
    async fn patch_shipping(&self, request: &PatchShippingRequest) -> Result<serde_json::Value>;
}
