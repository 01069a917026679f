//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! Every handler reads its inputs from the data directory snapshots, does its
//! work through the library modules and prints to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use chrono::Duration;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use crate::bonds::{validity, CouponRecord, PriceRecord};
use crate::cli::formatters;
use crate::cli::{Commands, ReportFormat};
use crate::config::AppConfig;
use crate::{importers, inflation, simulation, snapshot};

/// Route a parsed command to its handler
pub fn dispatch_command(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::FetchIndex { force } => dispatch_fetch_index(config, force),
        Commands::Normalize { prices, coupons } => dispatch_normalize(config, prices, coupons),
        Commands::ValidSeries {
            bond_type,
            min_years,
        } => dispatch_valid_series(config, bond_type, min_years),
        Commands::Simulate {
            format,
            refresh_index,
        } => dispatch_simulate(config, format, refresh_index),
    }
}

fn dispatch_fetch_index(config: &AppConfig, force: bool) -> Result<()> {
    let path = config.data.index_path();
    if path.exists() && !force {
        println!(
            "{} Index snapshot {} already present (use --force to download again)",
            "ℹ".blue().bold(),
            path.display()
        );
        return Ok(());
    }

    let records = inflation::sidra::fetch_monthly_index(&config.index.url)?;
    snapshot::write_records(&path, &records)?;
    println!(
        "{} Saved {} index months to {}",
        "✓".green().bold(),
        records.len(),
        path.display()
    );
    Ok(())
}

fn dispatch_normalize(
    config: &AppConfig,
    prices: Option<PathBuf>,
    coupons: Option<PathBuf>,
) -> Result<()> {
    let raw_prices = prices.unwrap_or_else(|| config.data.raw_prices_path());
    let raw_coupons = coupons.unwrap_or_else(|| config.data.raw_coupons_path());
    info!("Normalizing {:?} and {:?}", raw_prices, raw_coupons);

    let (prices, coupons) = importers::normalize(&raw_prices, &raw_coupons)?;

    let prices_path = config.data.prices_path();
    let coupons_path = config.data.coupons_path();
    snapshot::write_records(&prices_path, &prices)?;
    snapshot::write_records(&coupons_path, &coupons)?;

    println!(
        "{} Wrote {} price rows to {}",
        "✓".green().bold(),
        prices.len(),
        prices_path.display()
    );
    println!(
        "{} Wrote {} coupon rows to {}",
        "✓".green().bold(),
        coupons.len(),
        coupons_path.display()
    );
    Ok(())
}

fn dispatch_valid_series(
    config: &AppConfig,
    bond_type: Option<String>,
    min_years: Option<u32>,
) -> Result<()> {
    let (prices, coupons) = load_snapshots(config)?;
    let bond_type = bond_type.unwrap_or_else(|| config.filter.bond_type.clone());
    let min_days = min_years
        .map(|years| i64::from(years) * 365)
        .unwrap_or(config.filter.min_history_days);

    let maturities =
        validity::find_valid_series(&prices, &coupons, &bond_type, Duration::days(min_days));
    info!("{} valid {} series", maturities.len(), bond_type);

    print!(
        "{}",
        formatters::format_valid_series(&bond_type, &maturities, min_days)
    );
    Ok(())
}

fn dispatch_simulate(config: &AppConfig, format: ReportFormat, refresh_index: bool) -> Result<()> {
    let (prices, coupons) = load_snapshots(config)?;
    let index = inflation::load_or_fetch(&config.data.index_path(), &config.index.url, refresh_index)?;

    let report = simulation::simulate(&config.simulation, &prices, &coupons, &index)
        .with_context(|| format!("Simulation of {} failed", config.simulation.series()))?;

    let output = match format {
        ReportFormat::Table => formatters::format_report_table(&report),
        ReportFormat::Csv => formatters::format_report_csv(&report)?,
        ReportFormat::Json => formatters::format_report_json(&report)?,
    };
    print!("{}", output);
    if format == ReportFormat::Json {
        println!();
    }
    Ok(())
}

fn load_snapshots(config: &AppConfig) -> Result<(Vec<PriceRecord>, Vec<CouponRecord>)> {
    let prices_path = config.data.prices_path();
    let coupons_path = config.data.coupons_path();
    if !prices_path.exists() || !coupons_path.exists() {
        anyhow::bail!(
            "Snapshots not found in {}; run `tesouro-sim normalize` first",
            config.data.dir.display()
        );
    }

    let prices: Vec<PriceRecord> = snapshot::read_records(&prices_path)?;
    let coupons: Vec<CouponRecord> = snapshot::read_records(&coupons_path)?;
    info!(
        "Loaded {} price rows and {} coupon rows",
        prices.len(),
        coupons.len()
    );
    Ok((prices, coupons))
}
