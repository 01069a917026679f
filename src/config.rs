//! Run configuration.
//!
//! Every value has a default matching the analysis the tool was written for,
//! so a run without a config file reproduces it. A TOML file may override any
//! subset; dates are written as quoted ISO strings (`"2012-08-17"`).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bonds::validity::DEFAULT_MIN_HISTORY_DAYS;
use crate::bonds::BondSeries;
use crate::error::SimulationError;
use crate::inflation::sidra::SIDRA_IPCA_URL;
use crate::tesouro::IPCA_JUROS_SEMESTRAIS;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub index: IndexConfig,
    pub filter: FilterConfig,
    pub simulation: SimulationConfig,
}

/// Where raw exports and normalized snapshots live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub raw_prices: String,
    pub raw_coupons: String,
    pub prices_snapshot: String,
    pub coupons_snapshot: String,
    pub index_snapshot: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FilterConfig {
    pub bond_type: String,
    pub min_history_days: i64,
}

/// Parameters of one reinvestment simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub bond_type: String,
    pub maturity: NaiveDate,
    pub purchase_date: NaiveDate,
    pub initial_capital: Decimal,
    pub semester_count: usize,
    pub settlement_delay_days: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dados"),
            raw_prices: "PrecoTaxaTesouroDireto.csv".to_string(),
            raw_coupons: "CupomJurosTesouroDireto.csv".to_string(),
            prices_snapshot: "precos.csv".to_string(),
            coupons_snapshot: "cupons.csv".to_string(),
            index_snapshot: "ipcas.csv".to_string(),
        }
    }
}

impl DataConfig {
    pub fn raw_prices_path(&self) -> PathBuf {
        self.dir.join(&self.raw_prices)
    }

    pub fn raw_coupons_path(&self) -> PathBuf {
        self.dir.join(&self.raw_coupons)
    }

    pub fn prices_path(&self) -> PathBuf {
        self.dir.join(&self.prices_snapshot)
    }

    pub fn coupons_path(&self) -> PathBuf {
        self.dir.join(&self.coupons_snapshot)
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index_snapshot)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: SIDRA_IPCA_URL.to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            bond_type: IPCA_JUROS_SEMESTRAIS.to_string(),
            min_history_days: DEFAULT_MIN_HISTORY_DAYS,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bond_type: IPCA_JUROS_SEMESTRAIS.to_string(),
            maturity: NaiveDate::from_ymd_opt(2020, 8, 15).unwrap_or(NaiveDate::MIN),
            purchase_date: NaiveDate::from_ymd_opt(2012, 8, 17).unwrap_or(NaiveDate::MIN),
            initial_capital: dec!(100000),
            semester_count: 14,
            settlement_delay_days: 2,
        }
    }
}

impl SimulationConfig {
    pub fn series(&self) -> BondSeries {
        BondSeries::new(self.bond_type.clone(), self.maturity)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.bond_type.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "bond_type must not be empty".to_string(),
            ));
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(SimulationError::InvalidConfig(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.semester_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "semester_count must be at least 1".to_string(),
            ));
        }
        if self.purchase_date >= self.maturity {
            return Err(SimulationError::InvalidConfig(format!(
                "purchase_date {} is not before maturity {}",
                self.purchase_date, self.maturity
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    /// Config file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = AppConfig::default();
        let sim = &config.simulation;
        assert_eq!(sim.bond_type, "Tesouro IPCA+ com Juros Semestrais");
        assert_eq!(sim.maturity, NaiveDate::from_ymd_opt(2020, 8, 15).unwrap());
        assert_eq!(sim.purchase_date, NaiveDate::from_ymd_opt(2012, 8, 17).unwrap());
        assert_eq!(sim.initial_capital, dec!(100000));
        assert_eq!(sim.semester_count, 14);
        assert_eq!(sim.settlement_delay_days, 2);
        assert_eq!(config.data.prices_path(), PathBuf::from("dados/precos.csv"));
        assert_eq!(config.filter.min_history_days, 2920);
        assert!(sim.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[data]
dir = "/tmp/tesouro"

[simulation]
maturity = "2024-08-15"
purchase_date = "2014-08-19"
initial_capital = 50000
semester_count = 10
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data.dir, PathBuf::from("/tmp/tesouro"));
        assert_eq!(config.data.raw_prices, "PrecoTaxaTesouroDireto.csv");
        assert_eq!(config.simulation.maturity, NaiveDate::from_ymd_opt(2024, 8, 15).unwrap());
        assert_eq!(config.simulation.initial_capital, dec!(50000));
        assert_eq!(config.simulation.semester_count, 10);
        assert_eq!(config.simulation.settlement_delay_days, 2);
        assert_eq!(config.index.url, SIDRA_IPCA_URL);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example: AppConfig = toml::from_str(include_str!("../tesouro-sim.example.toml")).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(example.simulation.maturity, defaults.simulation.maturity);
        assert_eq!(example.simulation.initial_capital, defaults.simulation.initial_capital);
        assert_eq!(example.data.index_path(), defaults.data.index_path());
        assert_eq!(example.index.url, defaults.index.url);
        assert_eq!(example.filter.min_history_days, defaults.filter.min_history_days);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[simulation]\nsemester_count = \"many\"\n").unwrap();
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut config = SimulationConfig {
            semester_count: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        config.semester_count = 14;
        config.initial_capital = dec!(-1);
        assert!(config.validate().is_err());

        config.initial_capital = dec!(1000);
        config.purchase_date = config.maturity;
        assert!(config.validate().is_err());
    }
}
