//! Currency normalization.

use crate::models::DonationFigure;

use super::extract::RawFigure;

/// Convert a raw figure to canonical currency.
///
/// Figures already carrying the canonical currency code pass through;
/// anything else is scaled by the fixed configured rate and rounded to the
/// nearest integer. The rate is static, not fetched live; drift is an
/// accepted limitation.
pub fn normalize(raw: RawFigure, rate: f64) -> DonationFigure {
    if raw.in_canonical_currency {
        DonationFigure {
            amount: Some(raw.amount),
            target: Some(raw.target),
        }
    } else {
        DonationFigure {
            amount: Some(scale(raw.amount, rate)),
            target: Some(scale(raw.target, rate)),
        }
    }
}

fn scale(value: i64, rate: f64) -> i64 {
    (value as f64 * rate).round() as i64
}
