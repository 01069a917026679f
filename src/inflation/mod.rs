//! Monthly price index (IPCA) series
//!
//! Index values are keyed by the first day of their month. Lookups use
//! "most recent value at or before" semantics: a day inside a month sees that
//! month's index, and nothing is interpolated.

pub mod sidra;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::SimulationError;
use crate::snapshot;

/// Index value for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// First day of the month
    pub month: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub index_value: Decimal,
}

/// Index records sorted by month
#[derive(Debug, Clone)]
pub struct IndexSeries {
    records: Vec<IndexRecord>,
}

impl IndexSeries {
    pub fn new(mut records: Vec<IndexRecord>) -> Result<Self, SimulationError> {
        if records.is_empty() {
            return Err(SimulationError::EmptyIndex);
        }
        if let Some(bad) = records.iter().find(|r| r.index_value <= Decimal::ZERO) {
            return Err(SimulationError::NonPositiveIndex(bad.month));
        }
        records.sort_by_key(|r| r.month);
        Ok(Self { records })
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn first_month(&self) -> NaiveDate {
        self.records[0].month
    }

    pub fn last_month(&self) -> NaiveDate {
        self.records[self.records.len() - 1].month
    }

    /// Latest index value whose month is at or before `day`
    pub fn as_of(&self, day: NaiveDate) -> Result<Decimal, SimulationError> {
        let after = self.records.partition_point(|r| r.month <= day);
        if after == 0 {
            return Err(SimulationError::IndexOutOfRange {
                day,
                first: self.first_month(),
            });
        }
        Ok(self.records[after - 1].index_value)
    }

    /// Accumulated inflation factor between `base_day` and `day`
    pub fn factor(&self, day: NaiveDate, base_day: NaiveDate) -> Result<Decimal, SimulationError> {
        let current = self.as_of(day)?;
        let base = self.as_of(base_day)?;
        if base <= Decimal::ZERO {
            return Err(SimulationError::NonPositiveIndex(base_day));
        }
        if current <= Decimal::ZERO {
            return Err(SimulationError::NonPositiveIndex(day));
        }
        Ok(current / base)
    }

    /// Same series with every value multiplied by `scale`
    pub fn rescaled(&self, scale: Decimal) -> Self {
        Self {
            records: self
                .records
                .iter()
                .map(|r| IndexRecord {
                    month: r.month,
                    index_value: r.index_value * scale,
                })
                .collect(),
        }
    }
}

/// Read the index snapshot, downloading it first when missing or when `force` is set.
pub fn load_or_fetch(snapshot_path: &Path, url: &str, force: bool) -> Result<IndexSeries> {
    if force || !snapshot_path.exists() {
        info!("Index snapshot {:?} missing or refresh forced", snapshot_path);
        let records = sidra::fetch_monthly_index(url)?;
        snapshot::write_records(snapshot_path, &records)?;
    }

    let records: Vec<IndexRecord> = snapshot::read_records(snapshot_path)?;
    let series = IndexSeries::new(records)
        .with_context(|| format!("Index snapshot {:?} has no rows", snapshot_path))?;
    info!(
        "Loaded {} index months ({} to {})",
        series.records().len(),
        series.first_month(),
        series.last_month()
    );
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series() -> IndexSeries {
        IndexSeries::new(vec![
            IndexRecord {
                month: d(2012, 9, 1),
                index_value: dec!(3500.00),
            },
            IndexRecord {
                month: d(2012, 7, 1),
                index_value: dec!(3450.00),
            },
            IndexRecord {
                month: d(2012, 8, 1),
                index_value: dec!(3465.00),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_as_of_within_month() {
        assert_eq!(series().as_of(d(2012, 8, 17)).unwrap(), dec!(3465.00));
    }

    #[test]
    fn test_as_of_exact_month_start() {
        assert_eq!(series().as_of(d(2012, 8, 1)).unwrap(), dec!(3465.00));
        assert_eq!(series().as_of(d(2012, 7, 31)).unwrap(), dec!(3450.00));
    }

    #[test]
    fn test_as_of_after_last_month_uses_last_value() {
        assert_eq!(series().as_of(d(2014, 1, 1)).unwrap(), dec!(3500.00));
    }

    #[test]
    fn test_as_of_before_first_month_is_an_error() {
        let err = series().as_of(d(2012, 6, 30)).unwrap_err();
        assert!(matches!(err, SimulationError::IndexOutOfRange { first, .. } if first == d(2012, 7, 1)));
    }

    #[test]
    fn test_factor() {
        let factor = series().factor(d(2012, 9, 20), d(2012, 7, 10)).unwrap();
        assert_eq!(factor.round_dp(10), (dec!(3500) / dec!(3450)).round_dp(10));
    }

    #[test]
    fn test_zero_month_rejected() {
        let records = vec![
            IndexRecord {
                month: d(2012, 1, 1),
                index_value: dec!(3000),
            },
            IndexRecord {
                month: d(2013, 1, 1),
                index_value: dec!(0),
            },
            IndexRecord {
                month: d(2013, 3, 1),
                index_value: dec!(3100),
            },
        ];
        let err = IndexSeries::new(records).unwrap_err();
        assert!(matches!(err, SimulationError::NonPositiveIndex(month) if month == d(2013, 1, 1)));
    }

    #[test]
    fn test_factor_on_zero_scaled_series_is_an_error() {
        let zeroed = series().rescaled(Decimal::ZERO);
        assert!(matches!(
            zeroed.factor(d(2012, 9, 20), d(2012, 7, 10)),
            Err(SimulationError::NonPositiveIndex(_))
        ));
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            IndexSeries::new(Vec::new()),
            Err(SimulationError::EmptyIndex)
        ));
    }
}
