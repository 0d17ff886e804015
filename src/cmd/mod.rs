pub mod bijtelling;
pub mod calculate;
pub mod compare;
pub mod lookup;
pub mod schema;

use rust_decimal::Decimal;

/// Format a currency amount for display.
pub fn format_eur(amount: Decimal) -> String {
    format!("€{:.2}", amount.round_dp(2))
}

pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Format a distance without decimals.
pub fn format_km(value: Decimal) -> String {
    format!("{:.0} km", value.round_dp(0))
}
