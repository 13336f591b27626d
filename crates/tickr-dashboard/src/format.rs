//! Price and time formatting.

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tickr_core::Price;

/// Fraction digits for prices of at least one dollar.
const WHOLE_DIGITS: u32 = 2;
/// Fraction digits for sub-dollar prices.
const SUB_UNIT_DIGITS: u32 = 6;

/// Format a price as US dollars.
///
/// Two fraction digits at or above 1, six below; thousands separated by
/// commas; halves rounded away from zero.
///
/// `1234.5` -> `$1,234.50`, `0.5` -> `$0.500000`, `-2` -> `-$2.00`
pub fn format_usd(price: Price) -> String {
    let value = price.inner();
    let digits = if price.is_sub_unit() {
        SUB_UNIT_DIGITS
    } else {
        WHOLE_DIGITS
    };

    let mut rounded = value
        .abs()
        .round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(digits);

    let text = rounded.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let sign = if value.is_sign_negative() && rounded != Decimal::ZERO {
        "-"
    } else {
        ""
    };

    format!("{sign}${}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Card text for a price update seen at `at`, in local time.
pub fn updated_text(at: DateTime<Utc>) -> String {
    format!(
        "Last updated: {}",
        at.with_timezone(&Local).format("%H:%M:%S")
    )
}

/// Card text before the first update.
pub const WAITING_TEXT: &str = "Waiting for updates...";
