use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "tesouro-sim")]
#[command(
    version,
    about = "Tesouro Direto coupon reinvestment simulator"
)]
#[command(
    long_about = "Normalize Tesouro Direto price and coupon exports, fetch the IPCA index and simulate selling a bond series so that every semester pays the same inflation-corrected amount."
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding raw exports and snapshots (overrides the config)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the monthly IPCA index and store the snapshot
    FetchIndex {
        /// Download even when the snapshot already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Normalize the official price and coupon exports into snapshots
    Normalize {
        /// Price export (defaults to the data dir file)
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Coupon export (defaults to the data dir file)
        #[arg(long)]
        coupons: Option<PathBuf>,
    },

    /// List maturities with enough quote and coupon history
    ValidSeries {
        /// Bond type to inspect
        #[arg(long = "bond-type")]
        bond_type: Option<String>,

        /// Minimum history in years (365 days each)
        #[arg(long = "min-years")]
        min_years: Option<u32>,
    },

    /// Simulate the configured series and print the semester table
    Simulate {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
        format: ReportFormat,

        /// Download the index again before simulating
        #[arg(long = "refresh-index")]
        refresh_index: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}
