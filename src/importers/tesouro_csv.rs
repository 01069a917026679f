use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::bonds::{CouponRecord, PriceRecord};
use crate::error::SimulationError;
use crate::tesouro;

/// Read both official exports. Any malformed row aborts the whole run.
pub fn normalize(
    raw_prices: &Path,
    raw_coupons: &Path,
) -> Result<(Vec<PriceRecord>, Vec<CouponRecord>)> {
    let prices = parse_prices(&read_export(raw_prices)?)
        .with_context(|| format!("Failed to normalize {:?}", raw_prices))?;
    let coupons = parse_coupons(&read_export(raw_coupons)?)
        .with_context(|| format!("Failed to normalize {:?}", raw_coupons))?;
    Ok((prices, coupons))
}

/// Parse `PrecoTaxaTesouroDireto.csv` content
pub fn parse_prices(content: &str) -> Result<Vec<PriceRecord>> {
    let mut reader = reader_for(content);
    let headers = reader.headers()?.clone();

    let tipo_idx = find_header(&headers, "Tipo Titulo")?;
    let venc_idx = find_header(&headers, "Data Vencimento")?;
    let base_idx = find_header(&headers, "Data Base")?;
    let taxa_compra_idx = find_header(&headers, "Taxa Compra Manha")?;
    let taxa_venda_idx = find_header(&headers, "Taxa Venda Manha")?;
    let pu_compra_idx = find_header(&headers, "PU Compra Manha")?;
    let pu_venda_idx = find_header(&headers, "PU Venda Manha")?;
    let pu_base_idx = find_header(&headers, "PU Base Manha")?;

    let mut prices = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let record = result.with_context(|| format!("Failed to read CSV row {}", row))?;
        let field = |col: usize| field_at(&record, col, row);

        prices.push(PriceRecord {
            bond_type: text_field(field(tipo_idx)?, row)?,
            maturity: date_field(field(venc_idx)?, row)?,
            day: date_field(field(base_idx)?, row)?,
            buy_rate: decimal_field(field(taxa_compra_idx)?, row)?,
            sell_rate: decimal_field(field(taxa_venda_idx)?, row)?,
            buy_unit_price: decimal_field(field(pu_compra_idx)?, row)?,
            sell_unit_price: decimal_field(field(pu_venda_idx)?, row)?,
            base_unit_price: decimal_field(field(pu_base_idx)?, row)?,
        });
    }

    info!("Parsed {} price rows", prices.len());
    Ok(prices)
}

/// Parse `CupomJurosTesouroDireto.csv` content
pub fn parse_coupons(content: &str) -> Result<Vec<CouponRecord>> {
    let mut reader = reader_for(content);
    let headers = reader.headers()?.clone();

    let tipo_idx = find_header(&headers, "Tipo Titulo")?;
    let venc_idx = find_header(&headers, "Vencimento do Titulo")?;
    let resgate_idx = find_header(&headers, "Data Resgate")?;
    let pu_idx = find_header(&headers, "PU")?;
    let qtd_idx = find_header(&headers, "Quantidade")?;
    let valor_idx = find_header(&headers, "Valor")?;

    let mut coupons = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 2;
        let record = result.with_context(|| format!("Failed to read CSV row {}", row))?;
        let field = |col: usize| field_at(&record, col, row);

        coupons.push(CouponRecord {
            bond_type: text_field(field(tipo_idx)?, row)?,
            maturity: date_field(field(venc_idx)?, row)?,
            day: date_field(field(resgate_idx)?, row)?,
            unit_price: decimal_field(field(pu_idx)?, row)?,
            quantity: decimal_field(field(qtd_idx)?, row)?,
            total: decimal_field(field(valor_idx)?, row)?,
        });
    }

    info!("Parsed {} coupon rows", coupons.len());
    Ok(coupons)
}

/// Exports are usually UTF-8 but older ones come in Windows-1252
fn read_export(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&bytes[..]);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            debug!("{:?} is not UTF-8, decoding as Windows-1252", path);
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn reader_for(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(content.as_bytes())
}

fn find_header(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SimulationError::MissingColumn(name.to_string()).into())
}

fn field_at(record: &csv::StringRecord, col: usize, row: usize) -> Result<&str> {
    record
        .get(col)
        .map(str::trim)
        .ok_or_else(|| parse_error(row, format!("missing field {}", col + 1)))
}

fn text_field(value: &str, row: usize) -> Result<String> {
    if value.is_empty() {
        return Err(parse_error(row, "empty bond type".to_string()));
    }
    Ok(value.to_string())
}

fn date_field(value: &str, row: usize) -> Result<NaiveDate> {
    tesouro::parse_date_br(value).map_err(|e| parse_error(row, e.to_string()))
}

fn decimal_field(value: &str, row: usize) -> Result<Decimal> {
    tesouro::parse_decimal_br(value).map_err(|e| parse_error(row, e.to_string()))
}

fn parse_error(row: usize, message: String) -> anyhow::Error {
    anyhow!(SimulationError::Parse { row, message })
}
