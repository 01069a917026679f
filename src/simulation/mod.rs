//! Reinvestment simulation
//!
//! Buys a bond series once and then, at every coupon, sells just enough units
//! that coupon plus sale equals a constant real amount R corrected by
//! inflation since the purchase. R is the value that leaves exactly zero
//! units after the last configured semester.
//!
//! The recurrence is carried as [`Affine`] values in R, so R is solved with a
//! single division once all semesters are laid out. Taxes and inflation
//! adjustment are applied afterwards on the concrete values.

pub mod affine;

pub use affine::Affine;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, info};

use crate::bonds::{self, BondSeries, CouponRecord, PriceRecord, SeriesData};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::inflation::IndexSeries;
use crate::tax;

/// Cash flows of one semester after R has been solved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterOutcome {
    /// Units held before this semester's sale
    pub held_quantity: Decimal,
    pub coupon_day: NaiveDate,
    pub coupon_amount: Decimal,
    /// Accumulated inflation since the purchase, in percent
    pub inflation_pct: Decimal,
    pub sale_day: NaiveDate,
    pub sale_unit_price: Decimal,
    pub sale_amount: Decimal,
    pub quantity_sold: Decimal,
    /// Coupon plus sale
    pub redemption: Decimal,
    /// Redemption in purchase-date money
    pub redemption_adjusted: Decimal,
    pub tax_on_coupon: Decimal,
    pub tax_on_sale: Decimal,
    pub total_tax: Decimal,
    pub net_redemption: Decimal,
    pub net_redemption_adjusted: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_coupons: Decimal,
    pub total_sales: Decimal,
    pub total_redemption: Decimal,
    pub total_tax: Decimal,
    pub total_net_redemption: Decimal,
    pub total_net_redemption_adjusted: Decimal,
    pub mean_net_redemption_adjusted: Decimal,
    /// Sample standard deviation; needs at least two semesters
    pub std_dev_net_redemption_adjusted: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub series: BondSeries,
    pub purchase_date: NaiveDate,
    pub initial_capital: Decimal,
    pub initial_unit_price: Decimal,
    pub initial_quantity: Decimal,
    /// Solved R: constant real amount withdrawn each semester
    pub reinvested_amount: Decimal,
    /// Units left after the last semester once R is substituted
    pub final_quantity: Decimal,
    pub semesters: Vec<SemesterOutcome>,
    pub summary: Summary,
}

/// Select the configured series from normalized records and simulate it
pub fn simulate(
    config: &SimulationConfig,
    prices: &[PriceRecord],
    coupons: &[CouponRecord],
    index: &IndexSeries,
) -> Result<SimulationReport> {
    config.validate()?;
    let data = SeriesData::select(config.series(), prices, coupons);
    simulate_series(config, &data, index)
}

/// Simulate an already selected series
pub fn simulate_series(
    config: &SimulationConfig,
    data: &SeriesData,
    index: &IndexSeries,
) -> Result<SimulationReport> {
    let plan = Plan::new(config, data, index)?;
    let recurrence = plan.run(data, index, Affine::unknown())?;

    let reinvested_amount = recurrence
        .final_quantity
        .solve_zero()
        .context("Failed to solve the reinvested amount")?;
    info!(
        "Solved reinvested amount {} for {} over {} semesters",
        reinvested_amount.round_dp(2),
        data.series.label(),
        config.semester_count
    );

    let semesters: Vec<SemesterOutcome> = recurrence
        .steps
        .iter()
        .map(|step| step.resolve(reinvested_amount, &plan))
        .collect();
    let summary = Summary::from_semesters(&semesters);

    Ok(SimulationReport {
        series: data.series.clone(),
        purchase_date: config.purchase_date,
        initial_capital: config.initial_capital,
        initial_unit_price: plan.initial_unit_price,
        initial_quantity: plan.initial_quantity,
        reinvested_amount,
        final_quantity: recurrence.final_quantity.eval(reinvested_amount),
        semesters,
        summary,
    })
}

/// Run the recurrence numerically for a given R and return the units left at the end
pub fn final_quantity_for(
    config: &SimulationConfig,
    data: &SeriesData,
    index: &IndexSeries,
    reinvested_amount: Decimal,
) -> Result<Decimal> {
    let plan = Plan::new(config, data, index)?;
    let recurrence = plan.run(data, index, Affine::known(reinvested_amount))?;
    Ok(recurrence.final_quantity.constant)
}

/// Inputs fixed before the recurrence starts
struct Plan {
    purchase_date: NaiveDate,
    settlement_delay_days: u64,
    initial_unit_price: Decimal,
    initial_quantity: Decimal,
    coupons: Vec<(NaiveDate, Decimal)>,
}

impl Plan {
    fn new(config: &SimulationConfig, data: &SeriesData, index: &IndexSeries) -> Result<Self> {
        let purchase_date = config.purchase_date;
        let initial_unit_price = data
            .buy
            .price_on(purchase_date)
            .with_context(|| format!("Purchase date {} is not a trading day", purchase_date))?;
        if initial_unit_price <= Decimal::ZERO {
            return Err(SimulationError::MissingPrice {
                side: "buy",
                day: purchase_date,
            }
            .into());
        }

        // The baseline must exist before any semester is laid out
        index
            .as_of(purchase_date)
            .context("Index series does not cover the purchase date")?;

        let coupons = data
            .coupons
            .after(purchase_date, config.semester_count)
            .with_context(|| format!("Not enough coupon history for {}", data.series.label()))?;

        Ok(Self {
            purchase_date,
            settlement_delay_days: config.settlement_delay_days,
            initial_unit_price,
            initial_quantity: config.initial_capital / initial_unit_price,
            coupons,
        })
    }

    fn run(
        &self,
        data: &SeriesData,
        index: &IndexSeries,
        reinvested: Affine,
    ) -> Result<Recurrence> {
        let mut quantity = Affine::known(self.initial_quantity);
        let mut steps = Vec::with_capacity(self.coupons.len());

        for &(coupon_day, coupon_unit_price) in &self.coupons {
            let coupon = quantity * coupon_unit_price;
            let factor = index.factor(coupon_day, self.purchase_date)?;
            let sale = reinvested * factor - coupon;
            let (sale_day, sale_unit_price) =
                bonds::resolve_sale_day(coupon_day, self.settlement_delay_days, &data.sell)?;

            steps.push(Step {
                held: quantity,
                coupon_day,
                coupon,
                factor,
                sale_day,
                sale_unit_price,
                sale,
            });
            quantity = quantity - sale / sale_unit_price;
        }

        Ok(Recurrence {
            steps,
            final_quantity: quantity,
        })
    }
}

struct Recurrence {
    steps: Vec<Step>,
    final_quantity: Affine,
}

/// One semester before R is known
struct Step {
    held: Affine,
    coupon_day: NaiveDate,
    coupon: Affine,
    factor: Decimal,
    sale_day: NaiveDate,
    sale_unit_price: Decimal,
    sale: Affine,
}

impl Step {
    fn resolve(&self, reinvested_amount: Decimal, plan: &Plan) -> SemesterOutcome {
        let coupon_amount = self.coupon.eval(reinvested_amount);
        let sale_amount = self.sale.eval(reinvested_amount);
        let inflation_pct = dec!(100) * (self.factor - Decimal::ONE);
        let correction = Decimal::ONE + inflation_pct / dec!(100);

        let redemption = coupon_amount + sale_amount;
        let quantity_sold = sale_amount / self.sale_unit_price;

        let tax_on_coupon = tax::income_tax(coupon_amount, plan.purchase_date, self.coupon_day);
        let gain_per_unit = (self.sale_unit_price - plan.initial_unit_price).max(Decimal::ZERO);
        let tax_on_sale =
            tax::income_tax(quantity_sold * gain_per_unit, plan.purchase_date, self.sale_day);
        let total_tax = tax_on_coupon + tax_on_sale;
        let net_redemption = redemption - total_tax;

        debug!(
            "Semester {}: coupon {} sale {} on {} tax {}",
            self.coupon_day,
            coupon_amount.round_dp(2),
            sale_amount.round_dp(2),
            self.sale_day,
            total_tax.round_dp(2)
        );

        SemesterOutcome {
            held_quantity: self.held.eval(reinvested_amount),
            coupon_day: self.coupon_day,
            coupon_amount,
            inflation_pct,
            sale_day: self.sale_day,
            sale_unit_price: self.sale_unit_price,
            sale_amount,
            quantity_sold,
            redemption,
            redemption_adjusted: redemption / correction,
            tax_on_coupon,
            tax_on_sale,
            total_tax,
            net_redemption,
            net_redemption_adjusted: net_redemption / correction,
        }
    }
}

impl Summary {
    pub fn from_semesters(semesters: &[SemesterOutcome]) -> Self {
        let sum = |f: fn(&SemesterOutcome) -> Decimal| -> Decimal { semesters.iter().map(f).sum() };

        let total_net_redemption_adjusted = sum(|s| s.net_redemption_adjusted);
        let count = Decimal::from(semesters.len().max(1));
        let mean = total_net_redemption_adjusted / count;

        let std_dev = if semesters.len() > 1 {
            let squares: Decimal = semesters
                .iter()
                .map(|s| (s.net_redemption_adjusted - mean).powi(2))
                .sum();
            (squares / Decimal::from(semesters.len() - 1)).sqrt()
        } else {
            None
        };

        Self {
            total_coupons: sum(|s| s.coupon_amount),
            total_sales: sum(|s| s.sale_amount),
            total_redemption: sum(|s| s.redemption),
            total_tax: sum(|s| s.total_tax),
            total_net_redemption: sum(|s| s.net_redemption),
            total_net_redemption_adjusted,
            mean_net_redemption_adjusted: mean,
            std_dev_net_redemption_adjusted: std_dev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonds::{CouponSchedule, PriceCalendar};
    use crate::inflation::IndexRecord;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn config(semesters: usize) -> SimulationConfig {
        SimulationConfig {
            bond_type: "Tesouro IPCA+ com Juros Semestrais".to_string(),
            maturity: d(2020, 8, 15),
            purchase_date: d(2012, 8, 17),
            initial_capital: dec!(10000),
            semester_count: semesters,
            settlement_delay_days: 2,
        }
    }

    fn flat_index() -> IndexSeries {
        IndexSeries::new(vec![IndexRecord {
            month: d(2012, 1, 1),
            index_value: dec!(3000),
        }])
        .unwrap()
    }

    /// Two coupons of 50 per unit at a flat price of 1000
    fn two_semester_data() -> SeriesData {
        let days = [d(2012, 8, 17), d(2013, 2, 18), d(2013, 8, 19)];
        SeriesData {
            series: config(2).series(),
            buy: PriceCalendar::new("buy", days.iter().map(|&day| (day, dec!(1000)))),
            sell: PriceCalendar::new("sell", days.iter().map(|&day| (day, dec!(1000)))),
            coupons: CouponSchedule::new([(d(2013, 2, 15), dec!(50)), (d(2013, 8, 15), dec!(50))]),
        }
    }

    #[test]
    fn test_two_semester_closed_form() {
        // q0 = 10, g = 0.05: q2 = 10 * 1.05^2 - (R / 1000) * (1.05 + 1) = 0
        let report = simulate_series(&config(2), &two_semester_data(), &flat_index()).unwrap();

        let expected = dec!(11025) / dec!(2.05);
        assert!((report.reinvested_amount - expected).abs() < dec!(0.0000001));
        assert_eq!(report.initial_quantity, dec!(10));
        assert_eq!(report.semesters.len(), 2);

        let first = &report.semesters[0];
        assert_eq!(first.coupon_amount, dec!(500));
        assert_eq!(first.sale_day, d(2013, 2, 18));
        assert!(first.inflation_pct.is_zero());
        assert!((first.redemption - expected).abs() < dec!(0.0000001));
        // Sold at cost: no gain to tax
        assert!(first.tax_on_sale.is_zero());
        // 182 days after purchase
        assert_eq!(first.tax_on_coupon, dec!(100));
    }

    #[test]
    fn test_final_quantity_is_zero_after_substitution() {
        let data = two_semester_data();
        let report = simulate_series(&config(2), &data, &flat_index()).unwrap();
        assert!(report.final_quantity.abs() < dec!(0.0000000001));

        let replayed =
            final_quantity_for(&config(2), &data, &flat_index(), report.reinvested_amount).unwrap();
        assert!(replayed.abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_insufficient_coupons_fails_without_rows() {
        let err = simulate_series(&config(3), &two_semester_data(), &flat_index()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::InsufficientCoupons {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_purchase_day_without_quote() {
        let mut cfg = config(2);
        cfg.purchase_date = d(2012, 8, 18);
        let err = simulate_series(&cfg, &two_semester_data(), &flat_index()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::MissingPrice { side: "buy", .. })
        ));
    }

    #[test]
    fn test_index_starting_after_purchase() {
        let late = IndexSeries::new(vec![IndexRecord {
            month: d(2013, 1, 1),
            index_value: dec!(3000),
        }])
        .unwrap();
        let err = simulate_series(&config(2), &two_semester_data(), &late).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_index_is_an_error() {
        let zeroed = flat_index().rescaled(Decimal::ZERO);
        let err = simulate_series(&config(2), &two_semester_data(), &zeroed).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::NonPositiveIndex(_))
        ));
    }

    #[test]
    fn test_summary_statistics() {
        let report = simulate_series(&config(2), &two_semester_data(), &flat_index()).unwrap();
        let summary = &report.summary;
        let rows = &report.semesters;

        assert_eq!(summary.total_tax, rows[0].total_tax + rows[1].total_tax);
        assert_eq!(
            summary.mean_net_redemption_adjusted,
            (rows[0].net_redemption_adjusted + rows[1].net_redemption_adjusted) / dec!(2)
        );
        // Coupon tax drops from 20% to 17.5% in the second semester
        assert!(summary.std_dev_net_redemption_adjusted.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_single_semester_has_no_std_dev() {
        let report = simulate_series(&config(1), &two_semester_data(), &flat_index()).unwrap();
        assert_eq!(report.semesters.len(), 1);
        assert!(report.summary.std_dev_net_redemption_adjusted.is_none());
    }
}
