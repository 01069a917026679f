use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

const TESOURO_PREFIX: &str = "TESOURO";

/// Default bond type for filtering and simulation
pub const IPCA_JUROS_SEMESTRAIS: &str = "Tesouro IPCA+ com Juros Semestrais";

/// Short label for a series, e.g. `TESOURO_IPCA_JUROS_2020`
pub fn series_label(bond_type: &str, maturity: NaiveDate) -> String {
    let trimmed = bond_type.trim();
    let kind = normalize_bond_type(trimmed);
    let year = if kind == "RENDA" {
        // Renda+ maturities sit 19 years after the retirement year in the name
        (maturity.year() - 19).to_string()
    } else {
        maturity.year().to_string()
    };

    if has_juros_semestrais(trimmed) {
        format!("{}_{}_JUROS_{}", TESOURO_PREFIX, kind, year)
    } else {
        format!("{}_{}_{}", TESOURO_PREFIX, kind, year)
    }
}

/// Whether the bond type pays semiannual coupons
fn has_juros_semestrais(bond_type: &str) -> bool {
    bond_type.to_ascii_lowercase().contains("juros semestrais")
}

/// Parse a decimal in Brazilian notation ("1.234,56")
pub fn parse_decimal_br(input: &str) -> Result<Decimal> {
    let cleaned = input.trim().replace('.', "").replace(',', ".");
    if cleaned.is_empty() {
        return Err(anyhow!("Empty decimal input"));
    }
    Decimal::from_str(&cleaned).map_err(|err| anyhow!("Invalid decimal '{}': {}", input, err))
}

/// Parse a day-first date ("17/08/2012")
pub fn parse_date_br(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%d/%m/%Y")
        .with_context(|| format!("Invalid date: {}", value))
}

fn normalize_bond_type(raw: &str) -> String {
    let normalized = raw.to_ascii_lowercase();
    for (needle, kind) in [
        ("ipca", "IPCA"),
        ("igpm", "IGPM"),
        ("selic", "SELIC"),
        ("prefixado", "PREFIXADO"),
        ("renda", "RENDA"),
        ("educa", "EDUCA"),
    ] {
        if normalized.contains(needle) {
            return kind.to_string();
        }
    }

    raw.split_whitespace()
        .find(|part| !part.eq_ignore_ascii_case("tesouro"))
        .map(|part| part.replace('+', "").to_ascii_uppercase())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_series_label_with_juros() {
        let maturity = NaiveDate::from_ymd_opt(2020, 8, 15).unwrap();
        assert_eq!(
            series_label(IPCA_JUROS_SEMESTRAIS, maturity),
            "TESOURO_IPCA_JUROS_2020"
        );
    }

    #[test]
    fn test_series_label_without_juros() {
        let maturity = NaiveDate::from_ymd_opt(2035, 5, 15).unwrap();
        assert_eq!(series_label("Tesouro IPCA+", maturity), "TESOURO_IPCA_2035");
    }

    #[test]
    fn test_series_label_renda_offset() {
        let maturity = NaiveDate::from_ymd_opt(2079, 12, 15).unwrap();
        assert_eq!(
            series_label("Tesouro Renda+ Aposentadoria Extra", maturity),
            "TESOURO_RENDA_2060"
        );
    }

    #[test]
    fn test_has_juros_semestrais() {
        assert!(has_juros_semestrais("Tesouro Prefixado com Juros Semestrais"));
        assert!(!has_juros_semestrais("Tesouro Selic"));
    }

    #[test]
    fn test_parse_decimal_br() {
        assert_eq!(parse_decimal_br("1617,98").unwrap(), dec!(1617.98));
        assert_eq!(parse_decimal_br("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal_br("6,37").unwrap(), dec!(6.37));
        assert!(parse_decimal_br("").is_err());
        assert!(parse_decimal_br("abc").is_err());
    }

    #[test]
    fn test_parse_date_br() {
        assert_eq!(
            parse_date_br("17/08/2012").unwrap(),
            NaiveDate::from_ymd_opt(2012, 8, 17).unwrap()
        );
        assert!(parse_date_br("2012-08-17").is_err());
    }
}
