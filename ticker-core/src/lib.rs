//! Core types for the trading pair statistics service
//!
//! This crate defines the shared data structures used across the workspace,
//! including trading pairs, candles, per-pair statistics and the time-series
//! storage abstraction the aggregation engine reads from.

pub mod candle;
pub mod error;
pub mod memory;
pub mod pair;
pub mod stats;
pub mod storage;

pub use candle::{Candle, Interval, Order};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryTimeSeries;
pub use pair::TradingPair;
pub use stats::PairStatistic;
pub use storage::TimeSeriesStorage;
