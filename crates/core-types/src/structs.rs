use crate::enums::{AssetClass, OrderSide, OrderStatus, OrderType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The cash and margin ledger for a single user. One record per account,
/// created at provisioning and never deleted.
///
/// `balance` is realized cash only; equity (balance + unrealized P&L) is
/// derived by the `risk` crate at observation time, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub balance: Decimal,
    /// Running counter of margin reserved against open positions. Maintained
    /// incrementally by the order lifecycle, not recomputed from positions.
    pub used_margin: Decimal,
    /// Capacity for new positions. Debited by the reserved margin on open,
    /// credited with released margin plus realized P&L on close.
    pub available_funds: Decimal,
    pub realized_pnl: Decimal,
    /// Margin-level percentage at or below which the account is in margin call.
    pub margin_call_level: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Provisions a fresh account with the full balance available for trading.
    pub fn new(account_id: impl Into<String>, balance: Decimal, margin_call_level: Decimal) -> Self {
        Self {
            account_id: account_id.into(),
            balance,
            used_margin: Decimal::ZERO,
            available_funds: balance,
            realized_pnl: Decimal::ZERO,
            margin_call_level,
            created_at: Utc::now(),
        }
    }
}

/// A single placed order and, once executed, the trade it became.
/// Records are append-only: status transitions are monotonic and nothing
/// is ever physically deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub account_id: String,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub side: OrderSide,
    pub units: Decimal,
    /// Entry price for market orders; the trigger/limit price for entry orders.
    pub price_per_unit: Decimal,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// The exact margin reserved when this trade opened. Released verbatim on
    /// close so that reserve/release stay symmetric. Zero for pending orders.
    pub margin_reserved: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// Entry orders only; never enforced by this engine (no price watcher).
    pub expiration_date: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Realized P&L, set exactly once when the trade closes.
    pub pnl: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// The order's notional value. Always recomputed from units and price so
    /// the two can never drift apart.
    pub fn total_amount(&self) -> Decimal {
        self.units * self.price_per_unit
    }
}

/// One weighted-average-cost ledger row per (account, symbol) while any
/// units remain open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub position_id: Uuid,
    pub account_id: String,
    pub symbol: String,
    pub market_type: AssetClass,
    pub side: OrderSide,
    pub units: Decimal,
    /// Cost-basis weighted average of all currently-open units. Changes only
    /// when units are added, never on mark-to-market or partial reduction.
    pub average_price: Decimal,
    pub current_price: Decimal,
    pub total_value: Decimal,
    pub pnl: Decimal,
    pub pnl_percentage: Decimal,
    pub opened_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}
