//! Number formatting for reports
//!
//! Values are shown with Brazilian conventions: `.` groups thousands and `,`
//! separates decimals. Rounding is half-away-from-zero at the requested
//! number of places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format with `places` decimals in Brazilian notation: "1.234,56"
///
/// # Examples
/// ```
/// use tesouro_sim::utils::format_decimal_br;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal_br(dec!(1234.567), 2), "1.234,57");
/// assert_eq!(format_decimal_br(dec!(-0.5), 0), "-1");
/// ```
pub fn format_decimal_br(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;
    let plain = format!("{:.*}", places as usize, rounded.abs());
    let (integer_part, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, ch) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if is_negative { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("{}{},{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}

/// Money with two decimals: "R$ 1.234,56"
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", format_decimal_br(value, 2))
}

/// Percentage with two decimals: "12,34%"
pub fn format_pct(value: Decimal) -> String {
    format!("{}%", format_decimal_br(value, 2))
}
