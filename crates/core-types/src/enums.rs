use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side of the order
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(CoreError::InvalidInput(
                "direction".to_string(),
                format!("'{other}' is not a valid order side"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

impl OrderType {
    /// Limit and stop orders are "entry" orders: they rest at a trigger price
    /// and are persisted as pending instead of executing immediately.
    pub fn is_entry(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::Stop)
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "stop" => Ok(OrderType::Stop),
            other => Err(CoreError::InvalidInput(
                "order_type".to_string(),
                format!("'{other}' is not a valid order type"),
            )),
        }
    }
}

/// The lifecycle state of an order. Transitions are monotonic: a terminal
/// order is never reopened, and a record is never physically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Open,
    Closed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Open => write!(f, "open"),
            OrderStatus::Closed => write!(f, "closed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The asset class of a tradable instrument. Each class maps to a fixed
/// leverage/margin rule in the `margin` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Forex,
    Stocks,
    Crypto,
    Indices,
    Commodities,
}

impl AssetClass {
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Forex,
        AssetClass::Stocks,
        AssetClass::Crypto,
        AssetClass::Indices,
        AssetClass::Commodities,
    ];
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetClass::Forex => write!(f, "FOREX"),
            AssetClass::Stocks => write!(f, "STOCKS"),
            AssetClass::Crypto => write!(f, "CRYPTO"),
            AssetClass::Indices => write!(f, "INDICES"),
            AssetClass::Commodities => write!(f, "COMMODITIES"),
        }
    }
}

impl FromStr for AssetClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FOREX" => Ok(AssetClass::Forex),
            "STOCKS" => Ok(AssetClass::Stocks),
            "CRYPTO" => Ok(AssetClass::Crypto),
            "INDICES" => Ok(AssetClass::Indices),
            "COMMODITIES" => Ok(AssetClass::Commodities),
            other => Err(CoreError::InvalidInput(
                "asset_class".to_string(),
                format!("'{other}' is not a known asset class"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite().opposite(), OrderSide::Sell);
    }

    #[test]
    fn asset_class_parses_case_insensitively() {
        assert_eq!("forex".parse::<AssetClass>().unwrap(), AssetClass::Forex);
        assert_eq!("Stocks".parse::<AssetClass>().unwrap(), AssetClass::Stocks);
        assert!("BONDS".parse::<AssetClass>().is_err());
    }

    #[test]
    fn entry_order_types() {
        assert!(!OrderType::Market.is_entry());
        assert!(OrderType::Limit.is_entry());
        assert!(OrderType::Stop.is_entry());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Closed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Open.is_terminal());
    }
}
