//! Error handling for the Tesouro simulator
//!
//! Defines the domain failures of the pipeline and establishes a unified
//! Result type using anyhow for context chaining and error propagation.

use chrono::NaiveDate;
use thiserror::Error;

/// Domain errors raised by the normalizer, the index series and the simulator
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("missing column in CSV header: {0}")]
    MissingColumn(String),

    #[error("no {side} price on {day}")]
    MissingPrice { side: &'static str, day: NaiveDate },

    #[error("no sell price on or after {0}")]
    NoSaleDay(NaiveDate),

    #[error("expected {expected} coupons after {after}, found {found}")]
    InsufficientCoupons {
        expected: usize,
        found: usize,
        after: NaiveDate,
    },

    #[error("index lookup for {day} precedes first index month {first}")]
    IndexOutOfRange { day: NaiveDate, first: NaiveDate },

    #[error("index series is empty")]
    EmptyIndex,

    #[error("index value for {0} is not positive")]
    NonPositiveIndex(NaiveDate),

    #[error("reinvestment equation has no unique solution")]
    NoUniqueSolution,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = anyhow::Result<T>;
