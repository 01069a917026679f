// Importers module - official Tesouro Direto CSV exports

pub mod tesouro_csv;

pub use tesouro_csv::{normalize, parse_coupons, parse_prices};
