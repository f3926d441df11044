//! InfluxDB integration for the trading pair statistics service
//!
//! This crate provides a [`TimeSeriesStorage`](ticker_core::TimeSeriesStorage)
//! implementation backed by the InfluxDB 1.x HTTP API.

pub mod client;
pub mod config;
pub mod types;

pub use client::InfluxTimeSeries;
pub use config::InfluxConfig;
