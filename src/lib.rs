//! Tesouro Sim - Tesouro Direto coupon reinvestment simulator
//!
//! This library normalizes the official Tesouro Direto price and coupon
//! exports, keeps a monthly IPCA index series and solves for the constant
//! real amount a bond position can pay out every semester until it is
//! fully sold.

pub mod bonds;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod inflation;
pub mod simulation;
pub mod snapshot;
pub mod tax;
pub mod tesouro;
pub mod utils;
