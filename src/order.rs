//! Memoized order creation.
//!
//! Every shipping change of a checkout session patches the same order, so
//! the merchant's `createOrder` callback runs at most once successfully.
//! Concurrent first callers wait on the same in-flight creation.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{CheckoutError, Result};

/// Merchant-supplied source of order ids.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn create_order(&self) -> Result<String>;
}

#[async_trait]
impl<F, Fut> OrderSource for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    async fn create_order(&self) -> Result<String> {
        (self)().await
    }
}

/// Validated, memoized wrapper around an [`OrderSource`].
pub struct CreateOrder {
    source: Arc<dyn OrderSource>,
    order_id: OnceCell<String>,
}

impl CreateOrder {
    pub fn new(source: Arc<dyn OrderSource>) -> Self {
        Self {
            source,
            order_id: OnceCell::new(),
        }
    }

    /// Returns the session's order id, creating the order on first use.
    ///
    /// A failed creation is not cached; the next caller retries.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CreateOrder`] if the merchant returns an empty
    /// id or a post-capture `PAY-`/`PAYID-` id, or whatever error the
    /// merchant's callback produced.
    pub async fn order_id(&self) -> Result<String> {
        let order_id = self
            .order_id
            .get_or_try_init(|| async {
                let order_id = self.source.create_order().await?;
                validate_order_id(&order_id)?;
                debug!(order_id = %order_id, "Order created");
                Ok::<_, CheckoutError>(order_id)
            })
            .await?;

        Ok(order_id.clone())
    }
}

/// Wraps the merchant's order source, if any, in a memoized [`CreateOrder`].
pub fn get_create_order(source: Option<Arc<dyn OrderSource>>) -> Option<Arc<CreateOrder>> {
    source.map(|source| Arc::new(CreateOrder::new(source)))
}

fn validate_order_id(order_id: &str) -> Result<()> {
    if order_id.is_empty() {
        return Err(CheckoutError::CreateOrder(
            "Expected an order id to be passed".to_string(),
        ));
    }

    if order_id.contains("PAY-") || order_id.contains("PAYID-") {
        warn!(order_id, "Post-capture id passed to createOrder");
        return Err(CheckoutError::CreateOrder(
            "Do not pass PAY-XXX or PAYID-XXX directly into createOrder. Pass the EC-XXX token instead"
                .to_string(),
        ));
    }

    Ok(())
}
