//! Order totals: product price, promo discount, gateway amount.

use anyhow::{anyhow, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use super::models::{Discount, Product};

/// ISO 4217 currencies the gateway charges in whole units
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "JPY", "KMF", "KRW", "MGA", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub currency: String,
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount a discount takes off `subtotal`, never more than `subtotal`
///
/// Percentages are capped at 100; the result is rounded to cents.
pub fn discount_amount(subtotal: Decimal, discount_type: &str, amount: Decimal) -> Decimal {
    let amount = amount.max(Decimal::ZERO);
    let off = match discount_type {
        "percentage" => subtotal * amount.min(Decimal::ONE_HUNDRED) / Decimal::ONE_HUNDRED,
        _ => amount,
    };
    round_cents(off.min(subtotal))
}

/// Price a product with an optional, already-validated discount
pub fn quote(product: &Product, discount: Option<&Discount>) -> Quote {
    let subtotal = round_cents(product.price);
    let discount_amount = discount
        .map(|d| discount_amount(subtotal, &d.discount_type, d.amount))
        .unwrap_or(Decimal::ZERO);

    Quote {
        subtotal,
        discount_amount,
        total: subtotal - discount_amount,
        currency: product.currency.to_uppercase(),
    }
}

/// Total in the currency's minor unit, as the gateway expects
pub fn amount_minor(total: Decimal, currency: &str) -> Result<i64> {
    let scale = if ZERO_DECIMAL_CURRENCIES.contains(&currency.to_uppercase().as_str()) {
        Decimal::ONE
    } else {
        Decimal::ONE_HUNDRED
    };

    (total * scale)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| anyhow!("Amount {} {} does not fit in minor units", total, currency))
}
