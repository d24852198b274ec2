//! Buyer shipping-change orchestration.
//!
//! When the buyer picks a shipping address or option, the widget calls the
//! handler built by [`get_on_shipping_change`]. The handler resolves the
//! session's order id, hands the merchant callback a scoped
//! [`ShippingChangeActions`], and lets the callback's `order().patch` submit
//! the result to one of two backend APIs.
//!
//! This module is organized by concern:
//! - [`actions`] - The capability object handed to merchant code
//! - [`strategy`] - Backend selection
//! - [`state`] - Per-event lifecycle

mod actions;
mod state;
mod strategy;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::Result;
use crate::api::OrderApi;
use crate::config::{CheckoutConfig, Experiments, FeatureFlags};
use crate::models::{AccessToken, ShippingChangeData};
use crate::order::CreateOrder;

pub use actions::{InvocationActions, OrderActions, ShippingChangeActions};
pub use state::ShippingChangeState;
pub use strategy::UpdateStrategy;

use actions::PatchTarget;

/// Merchant callback invoked on every buyer shipping change.
#[async_trait]
pub trait OnShippingChange: Send + Sync {
    async fn on_shipping_change(
        &self,
        data: ShippingChangeData,
        actions: ShippingChangeActions,
    ) -> Result<serde_json::Value>;
}

#[async_trait]
impl<F, Fut> OnShippingChange for F
where
    F: Fn(ShippingChangeData, ShippingChangeActions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
{
    async fn on_shipping_change(
        &self,
        data: ShippingChangeData,
        actions: ShippingChangeActions,
    ) -> Result<serde_json::Value> {
        (self)(data, actions).await
    }
}

/// Merchant-facing props relevant to shipping changes.
#[derive(Clone)]
pub struct ShippingChangeProps {
    pub client_id: String,
    pub partner_attribution_id: Option<String>,
    pub feature_flags: FeatureFlags,
    pub experiments: Experiments,
    pub on_shipping_change: Option<Arc<dyn OnShippingChange>>,
}

impl ShippingChangeProps {
    /// Builds props from loaded configuration and the merchant's callback.
    pub fn from_config(
        config: &CheckoutConfig,
        on_shipping_change: Option<Arc<dyn OnShippingChange>>,
    ) -> Self {
        Self {
            client_id: config.client_id.clone(),
            partner_attribution_id: config.partner_attribution_id.clone(),
            feature_flags: config.feature_flags,
            experiments: config.experiments,
            on_shipping_change,
        }
    }
}

/// Session collaborators supplied alongside the props.
#[derive(Clone)]
pub struct ShippingChangeContext {
    pub facilitator_access_token: AccessToken,
    pub create_order: Arc<CreateOrder>,
    pub api: Arc<dyn OrderApi>,
}

/// Handler for buyer shipping-change events of one checkout session.
#[derive(Clone)]
pub struct ShippingChangeHandler {
    props: ShippingChangeProps,
    callback: Arc<dyn OnShippingChange>,
    context: ShippingChangeContext,
}

/// Builds the shipping-change handler, or `None` when the merchant did not
/// supply an `onShippingChange` callback.
pub fn get_on_shipping_change(
    props: ShippingChangeProps,
    context: ShippingChangeContext,
) -> Option<ShippingChangeHandler> {
    let callback = props.on_shipping_change.clone()?;
    Some(ShippingChangeHandler {
        props,
        callback,
        context,
    })
}

impl ShippingChangeHandler {
    /// Runs the merchant callback for one shipping-change event.
    ///
    /// Resolves with whatever the callback returns, typically the backend
    /// response of `order().patch`.
    ///
    /// # Errors
    ///
    /// Propagates order creation failures and callback errors unchanged.
    /// Backend failures surface as [`CheckoutError::PatchFailed`](crate::CheckoutError::PatchFailed)
    /// when the callback returns them.
    pub async fn handle(
        &self,
        data: ShippingChangeData,
        invocation: Arc<dyn InvocationActions>,
    ) -> Result<serde_json::Value> {
        let order_id = self.context.create_order.order_id().await?;
        let data = normalize_shipping_change_data(data, &order_id);

        let buyer_access_token = data.buyer_access_token().cloned();
        let strategy = UpdateStrategy::select(
            self.props
                .experiments
                .use_shipping_change_callback_mutation,
            data.app_name.as_deref(),
            buyer_access_token.is_some(),
        );

        let actions = ShippingChangeActions::new(
            invocation,
            PatchTarget {
                api: self.context.api.clone(),
                strategy,
                order_id: order_id.clone(),
                client_id: self.props.client_id.clone(),
                app_name: data.app_name.clone(),
                facilitator_access_token: self.context.facilitator_access_token.clone(),
                buyer_access_token,
                partner_attribution_id: self.props.partner_attribution_id.clone(),
                feature_flags: self.props.feature_flags,
            },
        );

        actions.mark_callback_invoked();
        let result = self
            .callback
            .on_shipping_change(data, actions.clone())
            .await;

        let state = actions.settle(result.is_ok());
        match &result {
            Ok(_) => debug!(order_id = %order_id, %state, "Shipping change settled"),
            Err(e) => warn!(order_id = %order_id, %state, error = %e, "Shipping change failed"),
        }

        result
    }
}

/// Fills in the order id and aliases an `EC-` token into `paymentID` and
/// `paymentId`.
pub fn normalize_shipping_change_data(
    mut data: ShippingChangeData,
    order_id: &str,
) -> ShippingChangeData {
    let order_id = data
        .order_id
        .get_or_insert_with(|| order_id.to_string())
        .clone();

    if let Some(token) = ec_token(&order_id) {
        data.payment_id = Some(token.to_string());
        data.payment_id_alias = Some(token.to_string());
    }

    data
}

fn ec_token(order_id: &str) -> Option<&str> {
    order_id
        .strip_prefix("EC-")
        .filter(|token| !token.is_empty())
        .filter(|token| {
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ec_order_id_is_aliased_into_payment_ids() {
        let data = ShippingChangeData {
            order_id: Some("EC-abc123".to_string()),
            ..Default::default()
        };

        let normalized = normalize_shipping_change_data(data, "5O190127TN364715T");
        assert_eq!(normalized.order_id.as_deref(), Some("EC-abc123"));
        assert_eq!(normalized.payment_id.as_deref(), Some("abc123"));
        assert_eq!(normalized.payment_id_alias.as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_order_id_uses_resolved_one() {
        let normalized =
            normalize_shipping_change_data(ShippingChangeData::default(), "EC-9XY");
        assert_eq!(normalized.order_id.as_deref(), Some("EC-9XY"));
        assert_eq!(normalized.payment_id.as_deref(), Some("9XY"));
    }

    #[test]
    fn non_ec_order_id_has_no_payment_alias() {
        let normalized =
            normalize_shipping_change_data(ShippingChangeData::default(), "5O190127TN364715T");
        assert!(normalized.payment_id.is_none());
        assert!(normalized.payment_id_alias.is_none());
    }

    #[test]
    fn ec_token_requires_word_characters() {
        assert_eq!(ec_token("EC-ab_c-1"), Some("ab_c-1"));
        assert_eq!(ec_token("EC-"), None);
        assert_eq!(ec_token("EC-a b"), None);
    }
}
