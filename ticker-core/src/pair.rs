//! Trading pair identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// A market on a specific exchange, e.g. `BINANCE:BTCUSDT`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradingPair {
    /// Exchange identifier
    pub exchange: String,
    /// Exchange-native symbol
    pub symbol: String,
}

impl TradingPair {
    pub fn new(exchange: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.symbol)
    }
}

impl std::str::FromStr for TradingPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((exchange, symbol)) if !exchange.is_empty() && !symbol.is_empty() => {
                Ok(TradingPair::new(exchange, symbol))
            }
            _ => Err(format!("Invalid trading pair: {}", s)),
        }
    }
}
