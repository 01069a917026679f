use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::IndexRecord;

/// IPCA index number (table 1737, variable 2266), every period, coded columns.
/// Data: https://sidra.ibge.gov.br/tabela/1737
/// API docs: https://apisidra.ibge.gov.br/home/ajuda
pub const SIDRA_IPCA_URL: &str =
    "https://apisidra.ibge.gov.br/values/t/1737/n1/all/p/all/v/2266/f/c?formato=json";

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct SidraRow {
    /// Period code "YYYYMM", e.g. "201308"
    #[serde(rename = "D2C")]
    period: String,
    /// Index value as a string, e.g. "3725.9500000000000"
    #[serde(rename = "V")]
    value: String,
}

/// Download the monthly index from SIDRA. Not retried.
pub fn fetch_monthly_index(url: &str) -> Result<Vec<IndexRecord>> {
    info!("Fetching monthly index from {}", url);

    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")?;
    let body = client
        .get(url)
        .send()
        .context("Failed to download index series")?
        .error_for_status()
        .context("Index API returned error status")?
        .text()
        .context("Failed to read index API response")?;

    let records = parse_sidra_rows(&body)?;
    info!("Fetched {} index months", records.len());
    Ok(records)
}

/// Parse a SIDRA JSON response. The first element is a header row and is discarded.
pub fn parse_sidra_rows(body: &str) -> Result<Vec<IndexRecord>> {
    let rows: Vec<SidraRow> =
        serde_json::from_str(body).context("Index API response is not the expected JSON")?;

    rows.iter()
        .skip(1)
        .map(|row| {
            Ok(IndexRecord {
                month: parse_period(&row.period)?,
                index_value: Decimal::from_str(row.value.trim())
                    .map_err(|e| anyhow!("Invalid index value '{}': {}", row.value, e))?,
            })
        })
        .collect()
}

fn parse_period(code: &str) -> Result<NaiveDate> {
    let code = code.trim();
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(anyhow!("Invalid period code '{}'", code));
    }
    let year: i32 = code[0..4].parse()?;
    let month: u32 = code[4..6].parse()?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| anyhow!("Invalid period code '{}'", code))
}
