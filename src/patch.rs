//! Patch construction for shipping changes.
//!
//! Queries are collected per [`PathCategory`]; at most one query exists per
//! category and the resulting patch keeps the order in which categories
//! were first set.

use serde_json::json;

use crate::breakdown::{build_breakdown, calculate_total_from_shipping_breakdown_amounts};
use crate::models::{
    Breakdown, DEFAULT_REFERENCE_ID, PatchOp, PathCategory, Query, ShippingAddress,
    ShippingOption, UpdatedAmounts,
};
use crate::{CheckoutError, Result};

/// Queries keyed by path category, in insertion order.
pub type Queries = Vec<(PathCategory, Query)>;

/// Projects the category map to a patch array in insertion order.
pub fn convert_queries_to_array(queries: &[(PathCategory, Query)]) -> Vec<Query> {
    queries.iter().map(|(_, query)| query.clone()).collect()
}

/// Marks the option matching `option`'s id as selected and every other
/// option as unselected, preserving order.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidInput`] if any option has no id or an
/// empty one. Nothing is returned in that case, so a partial update can
/// never escape.
pub fn update_shipping_options(
    option: &ShippingOption,
    options: &[ShippingOption],
) -> Result<Vec<ShippingOption>> {
    options
        .iter()
        .map(|opt| {
            let Some(id) = opt.id.as_deref().filter(|id| !id.is_empty()) else {
                return Err(CheckoutError::InvalidInput(
                    "Must provide an id with each shipping option.".to_string(),
                ));
            };

            let mut updated = opt.clone();
            updated.selected = option.id.as_deref() == Some(id);
            Ok(updated)
        })
        .collect()
}

/// Forces any shipping-options query to `replace` and returns the patch array.
pub fn update_operation_for_shipping_options(queries: &mut Queries) -> Vec<Query> {
    for (category, query) in queries.iter_mut() {
        if *category == PathCategory::ShippingOptions {
            query.op = PatchOp::Replace;
        }
    }

    convert_queries_to_array(queries)
}

/// Accumulates the queries a merchant produces while handling one shipping
/// change.
#[derive(Debug, Clone)]
pub struct ShippingQueries {
    reference_id: String,
    queries: Queries,
}

impl Default for ShippingQueries {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_ID)
    }
}

impl ShippingQueries {
    /// Creates an empty accumulator for the given purchase unit.
    pub fn new(reference_id: &str) -> Self {
        Self {
            reference_id: reference_id.to_string(),
            queries: Vec::new(),
        }
    }

    /// Replaces the order amount with a total recomputed from `breakdown`
    /// and `updated_amounts`.
    ///
    /// # Errors
    ///
    /// Propagates amount parsing and breakdown errors. Returns
    /// [`CheckoutError::InvalidInput`] if the resulting breakdown is empty,
    /// since the amount would have no currency.
    pub fn update_amount(
        &mut self,
        breakdown: &Breakdown,
        updated_amounts: &UpdatedAmounts,
    ) -> Result<&mut Self> {
        let value = calculate_total_from_shipping_breakdown_amounts(breakdown, updated_amounts)?;
        let breakdown = build_breakdown(breakdown, updated_amounts)?;
        let currency_code = breakdown
            .values()
            .next()
            .map(|m| m.currency_code.clone())
            .ok_or_else(|| {
                CheckoutError::InvalidInput(
                    "cannot update an amount without a breakdown currency_code".to_string(),
                )
            })?;

        let amount = json!({
            "currency_code": currency_code,
            "value": value,
            "breakdown": breakdown,
        });
        self.set(PathCategory::Amount, PatchOp::Replace, amount);
        Ok(self)
    }

    /// Selects `option` among `options` and stages the result.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidInput`] if an option has no id.
    pub fn update_shipping_options(
        &mut self,
        option: &ShippingOption,
        options: &[ShippingOption],
    ) -> Result<&mut Self> {
        let options = update_shipping_options(option, options)?;
        let value = serde_json::to_value(options)?;
        self.set(PathCategory::ShippingOptions, PatchOp::Add, value);
        Ok(self)
    }

    /// Stages a replacement shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Json`] if the address cannot be serialized.
    pub fn update_shipping_address(&mut self, address: &ShippingAddress) -> Result<&mut Self> {
        let value = serde_json::to_value(address)?;
        self.set(PathCategory::ShippingAddress, PatchOp::Replace, value);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Finalizes the staged queries into a patch array.
    pub fn build(mut self) -> Vec<Query> {
        update_operation_for_shipping_options(&mut self.queries)
    }

    fn set(&mut self, category: PathCategory, op: PatchOp, value: serde_json::Value) {
        let query = Query::new(op, category, &self.reference_id, value);
        match self.queries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, existing)) => *existing = query,
            None => self.queries.push((category, query)),
        }
    }
}
