//! Backend selection for a shipping-change patch.

use crate::validate::is_weasley;

/// Which backend call a shipping change ends in. Computed once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Dedicated shipping patch API, keyed by client id.
    DirectShippingPatch,
    /// Generic order patch API, authorized by facilitator/buyer tokens.
    GenericOrderPatch,
}

impl UpdateStrategy {
    /// Selects the strategy from the mutation experiment, the application
    /// identity, and whether the buyer is authenticated.
    ///
    /// Only `weasley` without a buyer access token, and with the experiment
    /// active, goes through the dedicated shipping patch API.
    pub fn select(
        use_shipping_change_callback_mutation: bool,
        app_name: Option<&str>,
        has_buyer_access_token: bool,
    ) -> Self {
        let is_weasley = app_name.is_some_and(is_weasley);

        if !use_shipping_change_callback_mutation || !is_weasley || has_buyer_access_token {
            UpdateStrategy::GenericOrderPatch
        } else {
            UpdateStrategy::DirectShippingPatch
        }
    }

    pub fn is_direct_shipping_patch(&self) -> bool {
        matches!(self, UpdateStrategy::DirectShippingPatch)
    }
}
