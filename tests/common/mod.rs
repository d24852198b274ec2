//! Shared test doubles for the shipping-change flow.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::json;

use checkout_shipping::api::{OrderApi, PatchOrderOptions, PatchShippingRequest};
use checkout_shipping::config::{Experiments, FeatureFlags};
use checkout_shipping::models::AccessToken;
use checkout_shipping::order::{CreateOrder, OrderSource};
use checkout_shipping::shipping::{
    InvocationActions, OnShippingChange, ShippingChangeContext, ShippingChangeProps,
};
use checkout_shipping::{CheckoutError, Result};

pub const CLIENT_ID: &str = "client-id-123";
pub const FACILITATOR_ACCESS_TOKEN: &str = "facilitator-token";
pub const PARTNER_ATTRIBUTION_ID: &str = "partner-bn";
pub const ORDER_ID: &str = "5O190127TN364715T";

static TRACING: Once = Once::new();

/// Installs a fmt subscriber that writes through the test harness.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    PatchOrder {
        order_id: String,
        data: serde_json::Value,
        options: PatchOrderOptions,
    },
    PatchShipping(PatchShippingRequest),
}

/// Order API double that records calls and succeeds or fails on demand.
#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    fail: bool,
}

impl RecordingApi {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::default(),
            fail: true,
        })
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) -> Result<serde_json::Value> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            Err(CheckoutError::Backend("UNPROCESSABLE_ENTITY".to_string()))
        } else {
            Ok(json!({}))
        }
    }
}

#[async_trait]
impl OrderApi for RecordingApi {
    async fn patch_order(
        &self,
        order_id: &str,
        data: &serde_json::Value,
        options: &PatchOrderOptions,
    ) -> Result<serde_json::Value> {
        self.record(ApiCall::PatchOrder {
            order_id: order_id.to_string(),
            data: data.clone(),
            options: options.clone(),
        })
    }

    async fn patch_shipping(&self, request: &PatchShippingRequest) -> Result<serde_json::Value> {
        self.record(ApiCall::PatchShipping(request.clone()))
    }
}

/// Widget invocation actions that count resolve/reject calls.
#[derive(Default)]
pub struct CountingInvocation {
    pub resolved: AtomicUsize,
    pub rejected: AtomicUsize,
}

impl CountingInvocation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvocationActions for CountingInvocation {
    async fn resolve(&self) -> Result<()> {
        self.resolved.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reject(&self) -> Result<()> {
        self.rejected.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Order source that always returns [`ORDER_ID`] and counts invocations.
pub fn order_source(calls: Arc<AtomicUsize>) -> Arc<dyn OrderSource> {
    Arc::new(move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CheckoutError>(ORDER_ID.to_string())
        }
    })
}

pub fn props(
    use_shipping_change_callback_mutation: bool,
    on_shipping_change: Option<Arc<dyn OnShippingChange>>,
) -> ShippingChangeProps {
    props_with_lsat(use_shipping_change_callback_mutation, false, on_shipping_change)
}

pub fn props_with_lsat(
    use_shipping_change_callback_mutation: bool,
    is_lsat_upgradable: bool,
    on_shipping_change: Option<Arc<dyn OnShippingChange>>,
) -> ShippingChangeProps {
    ShippingChangeProps {
        client_id: CLIENT_ID.to_string(),
        partner_attribution_id: Some(PARTNER_ATTRIBUTION_ID.to_string()),
        feature_flags: FeatureFlags { is_lsat_upgradable },
        experiments: Experiments {
            use_shipping_change_callback_mutation,
        },
        on_shipping_change,
    }
}

pub fn context(api: Arc<dyn OrderApi>, order_calls: Arc<AtomicUsize>) -> ShippingChangeContext {
    ShippingChangeContext {
        facilitator_access_token: AccessToken::new(FACILITATOR_ACCESS_TOKEN),
        create_order: Arc::new(CreateOrder::new(order_source(order_calls))),
        api,
    }
}
