//! Output formatting module for CLI display
//!
//! Turns a [`SimulationReport`] into a terminal table, CSV or JSON, keeping
//! presentation apart from the simulation itself.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::simulation::SimulationReport;
use crate::utils::{format_brl, format_decimal_br, format_pct};

/// Format a simulation report as a terminal table plus summary
pub fn format_report_table(report: &SimulationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {} ({})\n",
        "📈".cyan().bold(),
        report.series.label().bold(),
        report.series
    ));
    output.push_str(&format!(
        "Purchase on {}: {} at {} per unit = {} units\n\n",
        report.purchase_date.format("%d/%m/%Y"),
        format_brl(report.initial_capital),
        format_brl(report.initial_unit_price),
        format_decimal_br(report.initial_quantity, 6)
    ));

    #[derive(Tabled)]
    struct SemesterRow {
        #[tabled(rename = "Held")]
        held: String,
        #[tabled(rename = "Coupon Day")]
        coupon_day: String,
        #[tabled(rename = "Coupon")]
        coupon: String,
        #[tabled(rename = "Inflation")]
        inflation: String,
        #[tabled(rename = "Sale Day")]
        sale_day: String,
        #[tabled(rename = "Unit Price")]
        unit_price: String,
        #[tabled(rename = "Sale")]
        sale: String,
        #[tabled(rename = "Sold")]
        sold: String,
        #[tabled(rename = "Redemption")]
        redemption: String,
        #[tabled(rename = "Real")]
        redemption_adjusted: String,
        #[tabled(rename = "Coupon Tax")]
        coupon_tax: String,
        #[tabled(rename = "Sale Tax")]
        sale_tax: String,
        #[tabled(rename = "Tax")]
        tax: String,
        #[tabled(rename = "Net")]
        net: String,
        #[tabled(rename = "Net Real")]
        net_adjusted: String,
    }

    let rows: Vec<SemesterRow> = report
        .semesters
        .iter()
        .map(|s| SemesterRow {
            held: format_decimal_br(s.held_quantity, 4),
            coupon_day: format_day(s.coupon_day),
            coupon: format_decimal_br(s.coupon_amount, 2),
            inflation: format_pct(s.inflation_pct),
            sale_day: format_day(s.sale_day),
            unit_price: format_decimal_br(s.sale_unit_price, 2),
            sale: format_decimal_br(s.sale_amount, 2),
            sold: format_decimal_br(s.quantity_sold, 4),
            redemption: format_decimal_br(s.redemption, 2),
            redemption_adjusted: format_decimal_br(s.redemption_adjusted, 2),
            coupon_tax: format_decimal_br(s.tax_on_coupon, 2),
            sale_tax: format_decimal_br(s.tax_on_sale, 2),
            tax: format_decimal_br(s.total_tax, 2),
            net: format_decimal_br(s.net_redemption, 2),
            net_adjusted: format_decimal_br(s.net_redemption_adjusted, 2),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align everything except the two date columns
    table.modify(Columns::new(0..1), Alignment::right());
    table.modify(Columns::new(2..4), Alignment::right());
    table.modify(Columns::new(5..), Alignment::right());
    output.push_str(&table.to_string());

    let summary = &report.summary;
    output.push_str(&format!("\n\n{} Summary", "━".repeat(80).bright_black()));
    output.push_str(&format!(
        "\n{:<28} {}",
        "Reinvested amount (R):".bold(),
        format_brl(report.reinvested_amount).green()
    ));
    for (label, value) in [
        ("Total coupons:", summary.total_coupons),
        ("Total sales:", summary.total_sales),
        ("Total redemption:", summary.total_redemption),
        ("Total tax:", summary.total_tax),
        ("Total net:", summary.total_net_redemption),
        ("Total net (real):", summary.total_net_redemption_adjusted),
        ("Mean net per semester (real):", summary.mean_net_redemption_adjusted),
    ] {
        output.push_str(&format!("\n{:<28} {}", label.bold(), format_brl(value)));
    }
    let std_dev = summary
        .std_dev_net_redemption_adjusted
        .map(format_brl)
        .unwrap_or_else(|| "N/A".to_string());
    output.push_str(&format!("\n{:<28} {}\n", "Std dev (real):".bold(), std_dev));

    output
}

/// Format the semesters as CSV with full precision, one row per semester
pub fn format_report_csv(report: &SimulationReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for semester in &report.semesters {
        writer.serialize(semester)?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Format the whole report (semesters, R and summary) as pretty JSON
pub fn format_report_json(report: &SimulationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Format the list of bond series with enough history
pub fn format_valid_series(bond_type: &str, maturities: &[NaiveDate], min_days: i64) -> String {
    if maturities.is_empty() {
        return format!(
            "{} No {} series with at least {} days of history\n",
            "ℹ".blue().bold(),
            bond_type,
            min_days
        );
    }

    let mut output = format!(
        "{} {} series with at least {} days of history:\n",
        "✓".green().bold(),
        maturities.len(),
        min_days
    );
    for maturity in maturities {
        output.push_str(&format!(
            "  {}  {}\n",
            maturity.format("%Y-%m-%d"),
            crate::tesouro::series_label(bond_type, *maturity)
        ));
    }
    output
}

fn format_day(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}
