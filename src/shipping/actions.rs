//! Actions handed to the merchant's shipping-change callback.
//!
//! A [`ShippingChangeActions`] value is scoped to one event and is
//! single-use: the first of `resolve`, `reject` or `order().patch` consumes
//! it. `order().patch` is the only way to send patch data back and performs
//! at most one backend call per event. Any later action fails with
//! [`CheckoutError::PatchAlreadySubmitted`] (a repeated patch) or
//! [`CheckoutError::ActionsSettled`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use super::state::{EventTracker, ShippingChangeState};
use super::strategy::UpdateStrategy;
use crate::api::{OrderApi, PatchOrderOptions, PatchShippingRequest};
use crate::config::FeatureFlags;
use crate::models::AccessToken;
use crate::validate::{PatchLogContext, log_invalid_shipping_change_patches};
use crate::{CheckoutError, Result};

/// `resolve`/`reject` hooks provided by the checkout widget for one event.
#[async_trait]
pub trait InvocationActions: Send + Sync {
    async fn resolve(&self) -> Result<()>;
    async fn reject(&self) -> Result<()>;
}

/// Everything needed to submit one event's patch.
pub(crate) struct PatchTarget {
    pub(crate) api: Arc<dyn OrderApi>,
    pub(crate) strategy: UpdateStrategy,
    pub(crate) order_id: String,
    pub(crate) client_id: String,
    pub(crate) app_name: Option<String>,
    pub(crate) facilitator_access_token: AccessToken,
    pub(crate) buyer_access_token: Option<AccessToken>,
    pub(crate) partner_attribution_id: Option<String>,
    pub(crate) feature_flags: FeatureFlags,
}

struct ActionsInner {
    invocation: Arc<dyn InvocationActions>,
    target: PatchTarget,
    tracker: EventTracker,
}

/// Per-event capability object passed to the merchant callback.
#[derive(Clone)]
pub struct ShippingChangeActions {
    inner: Arc<ActionsInner>,
}

impl ShippingChangeActions {
    pub(crate) fn new(invocation: Arc<dyn InvocationActions>, target: PatchTarget) -> Self {
        Self {
            inner: Arc::new(ActionsInner {
                invocation,
                target,
                tracker: EventTracker::new(),
            }),
        }
    }

    /// Accepts the buyer's shipping change.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ActionsSettled`] if an action was already
    /// taken for this event, or the widget's error.
    pub async fn resolve(&self) -> Result<()> {
        self.consume(ShippingChangeState::NoPatch)?;
        self.inner.invocation.resolve().await
    }

    /// Rejects the buyer's shipping change.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ActionsSettled`] if an action was already
    /// taken for this event, or the widget's error.
    pub async fn reject(&self) -> Result<()> {
        self.consume(ShippingChangeState::NoPatch)?;
        self.inner.invocation.reject().await
    }

    /// Order-scoped actions.
    pub fn order(&self) -> OrderActions<'_> {
        OrderActions { actions: self }
    }

    /// Current lifecycle state of the event.
    pub fn state(&self) -> ShippingChangeState {
        self.inner.tracker.current()
    }

    /// The backend call a patch from this event will use.
    pub fn strategy(&self) -> UpdateStrategy {
        self.inner.target.strategy
    }

    pub(crate) fn mark_callback_invoked(&self) {
        self.inner.tracker.advance(ShippingChangeState::CallbackInvoked);
    }


    pub(crate) fn settle(&self, ok: bool) -> ShippingChangeState {
        self.inner.tracker.settle(ok)
    }

    /// Takes the event's single action, moving it to `next`.
    fn consume(&self, next: ShippingChangeState) -> Result<()> {
        let tracker = &self.inner.tracker;
        if tracker.advance(next) {
            return Ok(());
        }
        match tracker.current() {
            ShippingChangeState::PatchCollected | ShippingChangeState::Submitting
                if next == ShippingChangeState::PatchCollected =>
            {
                Err(CheckoutError::PatchAlreadySubmitted)
            }
            _ => Err(CheckoutError::ActionsSettled),
        }
    }

    async fn submit_patch(&self, data: serde_json::Value) -> Result<serde_json::Value> {
        self.consume(ShippingChangeState::PatchCollected)?;

        let target = &self.inner.target;
        let tracker = &self.inner.tracker;

        log_invalid_shipping_change_patches(
            PatchLogContext {
                app_name: target.app_name.as_deref().unwrap_or_default(),
                has_buyer_access_token: target.buyer_access_token.is_some(),
                should_use_patch_shipping: target.strategy.is_direct_shipping_patch(),
            },
            &data,
        );

        tracker.advance(ShippingChangeState::Submitting);
        let result = match target.strategy {
            UpdateStrategy::DirectShippingPatch => {
                let request = PatchShippingRequest {
                    client_id: target.client_id.clone(),
                    data,
                    order_id: target.order_id.clone(),
                };
                target.api.patch_shipping(&request).await
            }
            UpdateStrategy::GenericOrderPatch => {
                let options = PatchOrderOptions {
                    facilitator_access_token: target.facilitator_access_token.clone(),
                    buyer_access_token: target.buyer_access_token.clone(),
                    partner_attribution_id: target.partner_attribution_id.clone(),
                    force_rest_api: target.feature_flags.is_lsat_upgradable,
                };
                target
                    .api
                    .patch_order(&target.order_id, &data, &options)
                    .await
            }
        };

        match result {
            Ok(response) => {
                info!(
                    order_id = %target.order_id,
                    strategy = ?target.strategy,
                    "Order patched for shipping change"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    order_id = %target.order_id,
                    strategy = ?target.strategy,
                    error = %e,
                    "Order patch failed"
                );
                Err(CheckoutError::PatchFailed)
            }
        }
    }
}

/// Order-scoped actions of a [`ShippingChangeActions`].
pub struct OrderActions<'a> {
    actions: &'a ShippingChangeActions,
}

impl OrderActions<'_> {
    /// Submits `data` as the event's patch and returns the backend response.
    ///
    /// `data` is normally a list of [`Query`](crate::models::Query) values
    /// but is passed through untouched; malformed paths are only logged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::PatchFailed`] if the backend call fails,
    /// [`CheckoutError::PatchAlreadySubmitted`] on a second call, and
    /// [`CheckoutError::ActionsSettled`] after `resolve`/`reject` or
    /// settlement.
    pub async fn patch<T>(&self, data: &T) -> Result<serde_json::Value>
    where
        T: Serialize + Sync + ?Sized,
    {
        let data = serde_json::to_value(data)?;
        self.actions.submit_patch(data).await
    }
}
