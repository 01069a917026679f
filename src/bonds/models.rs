use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tesouro;

/// One quote of a bond series on a trading day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub bond_type: String,
    pub maturity: NaiveDate,
    pub day: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub buy_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub sell_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub buy_unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub sell_unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_unit_price: Decimal,
}

/// One coupon redemption of a bond series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRecord {
    pub bond_type: String,
    pub maturity: NaiveDate,
    /// Redemption day
    pub day: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

/// A bond series is identified by its type and maturity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BondSeries {
    pub bond_type: String,
    pub maturity: NaiveDate,
}

impl BondSeries {
    pub fn new(bond_type: impl Into<String>, maturity: NaiveDate) -> Self {
        Self {
            bond_type: bond_type.into(),
            maturity,
        }
    }

    pub fn matches(&self, bond_type: &str, maturity: NaiveDate) -> bool {
        self.bond_type == bond_type && self.maturity == maturity
    }

    pub fn label(&self) -> String {
        tesouro::series_label(&self.bond_type, self.maturity)
    }
}

impl fmt::Display for BondSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.bond_type, self.maturity.format("%d/%m/%Y"))
    }
}
