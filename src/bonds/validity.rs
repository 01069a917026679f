use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use std::collections::{BTreeSet, HashMap};

use super::models::{CouponRecord, PriceRecord};

/// Default minimum history for a series to be analysed: eight years
pub const DEFAULT_MIN_HISTORY_DAYS: i64 = 8 * 365;

/// Maturities of `bond_type` whose quotes and coupons each span at least
/// `min_span` (last day minus first day). Sorted and unique.
pub fn find_valid_series(
    prices: &[PriceRecord],
    coupons: &[CouponRecord],
    bond_type: &str,
    min_span: Duration,
) -> Vec<NaiveDate> {
    let price_spans = spans_by_maturity(
        prices
            .iter()
            .filter(|p| p.bond_type == bond_type)
            .map(|p| (p.maturity, p.day)),
    );
    let coupon_spans = spans_by_maturity(
        coupons
            .iter()
            .filter(|c| c.bond_type == bond_type)
            .map(|c| (c.maturity, c.day)),
    );

    let long_enough = |spans: &HashMap<NaiveDate, Duration>| -> BTreeSet<NaiveDate> {
        spans
            .iter()
            .filter(|(_, span)| **span >= min_span)
            .map(|(maturity, _)| *maturity)
            .collect()
    };

    long_enough(&price_spans)
        .intersection(&long_enough(&coupon_spans))
        .copied()
        .collect()
}

fn spans_by_maturity(
    days: impl Iterator<Item = (NaiveDate, NaiveDate)>,
) -> HashMap<NaiveDate, Duration> {
    days.into_group_map()
        .into_iter()
        .filter_map(|(maturity, days)| {
            let (first, last) = days.into_iter().minmax().into_option()?;
            Some((maturity, last - first))
        })
        .collect()
}
