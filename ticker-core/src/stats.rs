//! Per-pair summary statistic

use crate::candle::Candle;
use crate::pair::TradingPair;
use serde::{Deserialize, Serialize};

/// Earliest and latest daily candle of a trading pair.
///
/// This is both the element of the `/stats` response and of the cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStatistic {
    pub trading_pair: TradingPair,
    pub first: Candle,
    pub last: Candle,
}

impl PairStatistic {
    pub fn new(trading_pair: TradingPair, first: Candle, last: Candle) -> Self {
        Self {
            trading_pair,
            first,
            last,
        }
    }
}
