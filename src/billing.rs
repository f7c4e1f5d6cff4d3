// 💰 Billing Rule - flat fee tiers keyed to elapsed storage time
// Single source of truth: the checkout path and the receipt preview endpoint
// both call quote_fee(), so the advertised fee can never drift from the
// charged fee.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fee charged while the stored duration is at most one hour
pub const FEE_UP_TO_1H: i64 = 100;
/// Fee for more than one hour, up to three
pub const FEE_UP_TO_3H: i64 = 200;
/// Fee for more than three hours, up to six
pub const FEE_UP_TO_6H: i64 = 300;
/// Fee beyond six hours
pub const FEE_OVER_6H: i64 = 500;

/// Duration and fee for one locker stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: i64,
    pub fee: i64,
}

/// Compute the fee for a stay that began at `check_in` and ends now.
///
/// A locker that was never occupied (no check-in time) owes nothing.
/// Duration is rounded to whole minutes first; the tier is then taken from
/// the fractional hour count, inclusive at each upper bound: exactly 60
/// minutes is still the one-hour tier.
pub fn quote_fee(check_in: Option<DateTime<Utc>>, now: DateTime<Utc>) -> FeeQuote {
    let Some(check_in) = check_in else {
        return FeeQuote {
            duration_minutes: 0,
            fee: 0,
        };
    };

    let elapsed_seconds = (now - check_in).num_seconds().max(0);
    let duration_minutes = ((elapsed_seconds as f64) / 60.0).round() as i64;

    let hours = duration_minutes as f64 / 60.0;
    let fee = if hours <= 1.0 {
        FEE_UP_TO_1H
    } else if hours <= 3.0 {
        FEE_UP_TO_3H
    } else if hours <= 6.0 {
        FEE_UP_TO_6H
    } else {
        FEE_OVER_6H
    };

    FeeQuote {
        duration_minutes,
        fee,
    }
}
