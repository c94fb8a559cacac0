//! Prices arrive as decimal major units ("12 990,50") and are stored as
//! integer minor units.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a major-unit amount into minor units, rounding half away from zero.
pub fn parse_money(raw: &str) -> Result<i64, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err("value is empty".to_string());
    }

    let amount =
        Decimal::from_str(&cleaned).map_err(|_| format!("'{}' is not a valid amount", raw.trim()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!("'{}' must not be negative", raw.trim()));
    }

    let out_of_range = || format!("'{}' is out of range", raw.trim());
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(out_of_range)
}

/// Minor units back to a two-decimal major-unit string (`129050` -> `1290.50`).
pub fn format_money(minor: i64) -> String {
    Decimal::new(minor, 2).to_string()
}
