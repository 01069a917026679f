// Bonds module - normalized Tesouro records, per-series calendars and validity filtering

pub mod models;
pub mod validity;

pub use models::{BondSeries, CouponRecord, PriceRecord};
pub use validity::find_valid_series;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::SimulationError;

/// Sparse calendar of unit prices for one bond series, keyed by trading day
#[derive(Debug, Clone, Default)]
pub struct PriceCalendar {
    side: &'static str,
    prices: BTreeMap<NaiveDate, Decimal>,
}

impl PriceCalendar {
    pub fn new(side: &'static str, prices: impl IntoIterator<Item = (NaiveDate, Decimal)>) -> Self {
        Self {
            side,
            prices: prices.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.prices.contains_key(&day)
    }

    /// Exact lookup; a day without a quote is an error
    pub fn price_on(&self, day: NaiveDate) -> Result<Decimal, SimulationError> {
        self.prices
            .get(&day)
            .copied()
            .ok_or(SimulationError::MissingPrice {
                side: self.side,
                day,
            })
    }

    /// Earliest quoted day on or after `day`
    pub fn first_on_or_after(&self, day: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        self.prices.range(day..).next().map(|(d, p)| (*d, *p))
    }
}

/// Coupon unit prices of one bond series, sorted by redemption day
#[derive(Debug, Clone, Default)]
pub struct CouponSchedule {
    coupons: BTreeMap<NaiveDate, Decimal>,
}

impl CouponSchedule {
    pub fn new(coupons: impl IntoIterator<Item = (NaiveDate, Decimal)>) -> Self {
        Self {
            coupons: coupons.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// The first `count` coupons strictly after `day`.
    ///
    /// Fewer than `count` available is an input error; nothing is returned in that case.
    pub fn after(
        &self,
        day: NaiveDate,
        count: usize,
    ) -> Result<Vec<(NaiveDate, Decimal)>, SimulationError> {
        let selected: Vec<_> = self
            .coupons
            .range((std::ops::Bound::Excluded(day), std::ops::Bound::Unbounded))
            .take(count)
            .map(|(d, p)| (*d, *p))
            .collect();

        if selected.len() != count {
            return Err(SimulationError::InsufficientCoupons {
                expected: count,
                found: selected.len(),
                after: day,
            });
        }
        Ok(selected)
    }
}

/// Calendars of the configured series, built from the normalized snapshots
#[derive(Debug, Clone)]
pub struct SeriesData {
    pub series: BondSeries,
    pub buy: PriceCalendar,
    pub sell: PriceCalendar,
    pub coupons: CouponSchedule,
}

impl SeriesData {
    /// Select one series. Quotes without a positive sell price are dropped
    /// from both calendars.
    pub fn select(series: BondSeries, prices: &[PriceRecord], coupons: &[CouponRecord]) -> Self {
        let quotes: Vec<&PriceRecord> = prices
            .iter()
            .filter(|p| series.matches(&p.bond_type, p.maturity))
            .filter(|p| p.sell_unit_price > Decimal::ZERO)
            .collect();

        let buy = PriceCalendar::new("buy", quotes.iter().map(|p| (p.day, p.buy_unit_price)));
        let sell = PriceCalendar::new("sell", quotes.iter().map(|p| (p.day, p.sell_unit_price)));
        let coupons = CouponSchedule::new(
            coupons
                .iter()
                .filter(|c| series.matches(&c.bond_type, c.maturity))
                .map(|c| (c.day, c.unit_price)),
        );

        tracing::debug!(
            "Selected {}: {} quotes, {} coupons",
            series.label(),
            buy.len(),
            coupons.len()
        );

        Self {
            series,
            buy,
            sell,
            coupons,
        }
    }
}

/// Sale day for a coupon: coupon day plus the settlement delay, moved forward
/// to the next day with a sell quote.
pub fn resolve_sale_day(
    coupon_day: NaiveDate,
    delay_days: u64,
    sell: &PriceCalendar,
) -> Result<(NaiveDate, Decimal), SimulationError> {
    let earliest = coupon_day
        .checked_add_days(Days::new(delay_days))
        .ok_or(SimulationError::NoSaleDay(coupon_day))?;
    sell.first_on_or_after(earliest)
        .ok_or(SimulationError::NoSaleDay(earliest))
}
