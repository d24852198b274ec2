//! Amount breakdown recomputation.
//!
//! When a merchant changes shipping, tax, or discount amounts in response to
//! a shipping change, the order total has to be rebuilt from the itemized
//! breakdown. Discount keys are stored as non-negative magnitudes but
//! subtract from the total.
//!
//! Unparseable amounts fail with [`CheckoutError::InvalidAmount`] rather
//! than propagating a NaN-like sentinel.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::amount::parse_amount;
use crate::models::{Breakdown, BreakdownKey, Money, UpdatedAmounts};
use crate::{CheckoutError, Result};

/// Computes the order total from `breakdown` with `updated_amounts` applied.
///
/// Every key of the breakdown contributes its updated value if one is
/// supplied, its existing value otherwise. Updated keys missing from the
/// breakdown are folded in afterwards. The result has exactly two decimal
/// places.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidAmount`] if any contributing value is not
/// a decimal number.
pub fn calculate_total_from_shipping_breakdown_amounts(
    breakdown: &Breakdown,
    updated_amounts: &UpdatedAmounts,
) -> Result<String> {
    let mut total = Decimal::ZERO;

    for (key, money) in breakdown {
        let value = updated_value(updated_amounts, *key).unwrap_or(&money.value);
        total += contribution(*key, value)?;
    }

    for (key, value) in updated_amounts {
        if breakdown.contains_key(key) {
            continue;
        }
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            total += contribution(*key, value)?;
        }
    }

    Ok(format_amount(total))
}

/// Returns a copy of `breakdown` with `updated_amounts` applied.
///
/// New keys inherit the currency of the first existing entry, where "first"
/// follows [`BreakdownKey`] order (`item_total` before `shipping` and so on)
/// rather than the order the entries were inserted. New discount values are
/// normalized to a two-decimal magnitude. Existing keys take the updated
/// string verbatim.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidInput`] if a new key must be inserted into
/// an empty breakdown (there is no currency to inherit), or
/// [`CheckoutError::InvalidAmount`] if a new discount value is not a number.
pub fn build_breakdown(breakdown: &Breakdown, updated_amounts: &UpdatedAmounts) -> Result<Breakdown> {
    let currency_code = breakdown.values().next().map(|m| m.currency_code.clone());
    let mut updated = breakdown.clone();

    for (key, value) in updated_amounts {
        let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };

        if let Some(existing) = updated.get_mut(key) {
            existing.value = value.to_string();
            continue;
        }

        let currency_code = currency_code.as_deref().ok_or_else(|| {
            CheckoutError::InvalidInput(format!(
                "cannot add `{}` to a breakdown without a currency_code",
                key.as_str()
            ))
        })?;

        let value = if key.is_discount() {
            format_amount(parse_amount(*key, value)?.abs())
        } else {
            value.to_string()
        };

        updated.insert(*key, Money::new(currency_code, &value));
    }

    Ok(updated)
}

fn updated_value(updated_amounts: &UpdatedAmounts, key: BreakdownKey) -> Option<&String> {
    updated_amounts
        .get(&key)
        .and_then(Option::as_ref)
        .filter(|v| !v.is_empty())
}

fn contribution(key: BreakdownKey, value: &str) -> Result<Decimal> {
    let amount = parse_amount(key, value)?;
    if key.is_discount() {
        Ok(-amount.abs())
    } else {
        Ok(amount)
    }
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
