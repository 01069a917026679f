// Tax module - regressive income tax on fixed income (Tesouro Direto)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Income tax rate for a gain realised `days_held` days after the purchase.
///
/// Regressive table for fixed income:
/// - up to 179 days: 22.5%
/// - 180 to 359 days: 20%
/// - 360 to 719 days: 17.5%
/// - 720 days or more: 15%
pub fn income_tax_rate(days_held: i64) -> Decimal {
    if days_held < 180 {
        dec!(0.225)
    } else if days_held < 360 {
        dec!(0.20)
    } else if days_held < 720 {
        dec!(0.175)
    } else {
        dec!(0.15)
    }
}

/// Calendar days from `purchase` to `event`
pub fn days_held(purchase: NaiveDate, event: NaiveDate) -> i64 {
    (event - purchase).num_days()
}

/// Tax due on `income` realised on `event` for a position bought on `purchase`
pub fn income_tax(income: Decimal, purchase: NaiveDate, event: NaiveDate) -> Decimal {
    income * income_tax_rate(days_held(purchase, event))
}
