//! # Meridian Engine Crate
//!
//! The order lifecycle state machine: validation, margin reservation, trade
//! persistence, and the order/position transitions on close or cancel.
//!
//! ## Architectural Principles
//!
//! - **Pure Core, Thin Shell:** Every number the engine writes is produced by
//!   the pure calculators in `margin`, `portfolio`, and `risk`. The engine
//!   itself only sequences reads, checks, and one atomic commit per
//!   operation.
//! - **Per-Account Serialization:** Two requests touching the same account
//!   are serialized by an account-keyed mutex held across the whole
//!   read-compute-commit sequence. Without it, two simultaneous market
//!   orders could both pass the funds check against a stale read and jointly
//!   over-reserve margin.
//! - **Typed Failure Results:** Rejections never mutate state. Callers get
//!   `EngineError` values; the `api` module converts them into the
//!   `{success, message}` envelopes the outer surface expects, so no error
//!   ever crosses that boundary as a panic.

pub mod api;
pub mod error;

use chrono::{DateTime, Utc};
use core_types::{AssetClass, OrderSide, OrderStatus, OrderType, PortfolioPosition, Trade};
use margin::{calculate_margin, MarginBreakdown};
use portfolio::{mark_to_market, merge_open, reduce_on_close};
use risk::{compute_metrics, AccountMetrics, RiskError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use store::{TradeStore, WriteOp};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

pub use error::EngineError;
use error::fetch_err;

/// A request to place an order, as received from the outer surface.
/// The identity layer has already resolved the account id; the engine
/// trusts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub units: Decimal,
    /// Execution price for market orders; trigger/limit price for entry orders.
    pub price: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    /// Entry orders only.
    pub expiration_date: Option<DateTime<Utc>>,
}

/// The outcome of a successful order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub status: OrderStatus,
    /// Present for market orders only; entry orders have not executed.
    pub execution_price: Option<Decimal>,
    pub margin_required: Decimal,
}

/// The outcome of a successful position close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseReceipt {
    pub trade_id: Uuid,
    pub close_price: Decimal,
    pub pnl: Decimal,
    pub margin_released: Decimal,
}

/// One open trade marked to a live price snapshot, as surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionView {
    pub trade_id: Uuid,
    pub symbol: String,
    pub side: OrderSide,
    pub units: Decimal,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub position_value: Decimal,
    pub margin_used: Decimal,
    pub unrealized_pnl: Decimal,
    pub pnl_percentage: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub status: OrderStatus,
    pub opened_at: Option<DateTime<Utc>>,
}

/// Hands out one mutex per account so lifecycle sequences on the same
/// account never interleave.
#[derive(Default)]
struct AccountLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    async fn acquire(&self, account_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(account_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// The central orchestrator for order and position accounting.
pub struct TradeEngine {
    store: Arc<dyn TradeStore>,
    locks: AccountLocks,
}

impl TradeEngine {
    pub fn new(store: Arc<dyn TradeStore>) -> Self {
        Self {
            store,
            locks: AccountLocks::default(),
        }
    }

    /// Places an order. Market orders execute immediately against the
    /// supplied price: the funds check, margin reservation, trade write, and
    /// ledger merge happen as one serialized, atomically-committed sequence.
    /// Entry (limit/stop) orders are persisted as pending with no funds
    /// check and no reservation.
    pub async fn place_order(
        &self,
        account_id: &str,
        request: OrderRequest,
    ) -> Result<OrderReceipt, EngineError> {
        validate_order(&request)?;
        let breakdown = calculate_margin(request.asset_class, request.units, request.price)?;

        let _guard = self.locks.acquire(account_id).await;

        if request.order_type.is_entry() {
            return self.place_entry_order(account_id, request, breakdown).await;
        }

        let mut account = self.store.account(account_id).await.map_err(fetch_err)?;
        if account.available_funds < breakdown.required_margin {
            return Err(EngineError::InsufficientFunds {
                required: breakdown.required_margin,
                available: account.available_funds,
            });
        }

        let now = Utc::now();
        let trade = Trade {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            symbol: request.symbol.clone(),
            asset_class: request.asset_class,
            side: request.side,
            units: request.units,
            price_per_unit: request.price,
            order_type: request.order_type,
            status: OrderStatus::Open,
            margin_reserved: breakdown.required_margin,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            expiration_date: None,
            executed_at: Some(now),
            closed_at: None,
            pnl: None,
            created_at: now,
        };

        account.used_margin += breakdown.required_margin;
        account.available_funds -= breakdown.required_margin;

        let existing = self
            .store
            .position(account_id, &request.symbol)
            .await
            .map_err(fetch_err)?;
        let position = merge_open(
            existing.as_ref(),
            account_id,
            &request.symbol,
            request.asset_class,
            request.side,
            request.units,
            request.price,
        );

        let receipt = OrderReceipt {
            order_id: trade.id,
            status: OrderStatus::Open,
            execution_price: Some(request.price),
            margin_required: breakdown.required_margin,
        };

        self.store
            .commit(vec![
                WriteOp::PutTrade(trade),
                WriteOp::PutAccount(account),
                WriteOp::PutPosition(position),
            ])
            .await
            .map_err(EngineError::TradeExecution)?;

        tracing::info!(
            account = %account_id,
            symbol = %request.symbol,
            side = %request.side,
            units = %request.units,
            margin = %breakdown.required_margin,
            "Market order executed."
        );
        Ok(receipt)
    }

    /// Persists a limit/stop order as pending. Nothing in this engine later
    /// promotes it; that requires an explicit price-watching component this
    /// system does not have.
    async fn place_entry_order(
        &self,
        account_id: &str,
        request: OrderRequest,
        breakdown: MarginBreakdown,
    ) -> Result<OrderReceipt, EngineError> {
        // The account record is untouched, but the account must exist.
        self.store.account(account_id).await.map_err(fetch_err)?;

        let now = Utc::now();
        let trade = Trade {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            symbol: request.symbol.clone(),
            asset_class: request.asset_class,
            side: request.side,
            units: request.units,
            price_per_unit: request.price,
            order_type: request.order_type,
            status: OrderStatus::Pending,
            margin_reserved: Decimal::ZERO,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            expiration_date: request.expiration_date,
            executed_at: None,
            closed_at: None,
            pnl: None,
            created_at: now,
        };
        let order_id = trade.id;

        self.store
            .commit(vec![WriteOp::PutTrade(trade)])
            .await
            .map_err(EngineError::TradeExecution)?;

        tracing::info!(
            account = %account_id,
            symbol = %request.symbol,
            trigger_price = %request.price,
            "Entry order placed as pending."
        );
        Ok(OrderReceipt {
            order_id,
            status: OrderStatus::Pending,
            execution_price: None,
            margin_required: breakdown.required_margin,
        })
    }

    /// Closes an open position at the supplied exit price: settles P&L,
    /// releases exactly the margin reserved at open, and reduces or removes
    /// the ledger row, all in one atomic commit.
    pub async fn close_position(
        &self,
        account_id: &str,
        trade_id: Uuid,
        exit_price: Decimal,
    ) -> Result<CloseReceipt, EngineError> {
        if exit_price <= Decimal::ZERO {
            return Err(EngineError::Validation {
                field: "price".to_string(),
                reason: "exit price must be greater than zero".to_string(),
            });
        }

        let _guard = self.locks.acquire(account_id).await;

        let trade = self.store.trade(trade_id).await.map_err(fetch_err)?;
        if trade.account_id != account_id {
            return Err(EngineError::NotFound(format!("trade {trade_id}")));
        }
        if trade.status != OrderStatus::Open {
            return Err(EngineError::OrderStateConflict {
                trade_id,
                status: trade.status,
                attempted: "closed",
            });
        }

        let pnl = margin::calculate_pnl(trade.side, trade.price_per_unit, exit_price, trade.units);
        // Release the margin recorded at open, not a recomputed value, so
        // reserve and release stay symmetric whatever the P&L.
        let released = trade.margin_reserved;

        let mut account = self.store.account(account_id).await.map_err(fetch_err)?;
        account.used_margin -= released;
        account.available_funds += released + pnl;
        account.balance += pnl;
        account.realized_pnl += pnl;

        let now = Utc::now();
        let mut closed = trade.clone();
        closed.status = OrderStatus::Closed;
        closed.closed_at = Some(now);
        closed.pnl = Some(pnl);

        let mut batch = vec![WriteOp::PutTrade(closed), WriteOp::PutAccount(account)];
        match self
            .store
            .position(account_id, &trade.symbol)
            .await
            .map_err(fetch_err)?
        {
            Some(position) => match reduce_on_close(&position, trade.units, exit_price)? {
                Some(reduced) => batch.push(WriteOp::PutPosition(reduced)),
                None => batch.push(WriteOp::DeletePosition {
                    account_id: account_id.to_string(),
                    symbol: trade.symbol.clone(),
                }),
            },
            None => {
                tracing::warn!(
                    account = %account_id,
                    symbol = %trade.symbol,
                    trade = %trade_id,
                    "No ledger row found for closed trade; skipping portfolio reduction."
                );
            }
        }

        self.store
            .commit(batch)
            .await
            .map_err(EngineError::TradeExecution)?;

        tracing::info!(
            account = %account_id,
            trade = %trade_id,
            pnl = %pnl,
            released = %released,
            "Position closed."
        );
        Ok(CloseReceipt {
            trade_id,
            close_price: exit_price,
            pnl,
            margin_released: released,
        })
    }

    /// Cancels a pending entry order. Only pending orders can be cancelled;
    /// a second cancel (or a cancel after close) is a state conflict, never
    /// a silent success.
    pub async fn cancel_order(&self, account_id: &str, trade_id: Uuid) -> Result<(), EngineError> {
        let _guard = self.locks.acquire(account_id).await;

        let trade = self.store.trade(trade_id).await.map_err(fetch_err)?;
        if trade.account_id != account_id {
            return Err(EngineError::NotFound(format!("trade {trade_id}")));
        }
        if trade.status != OrderStatus::Pending {
            return Err(EngineError::OrderStateConflict {
                trade_id,
                status: trade.status,
                attempted: "cancelled",
            });
        }

        let mut cancelled = trade;
        cancelled.status = OrderStatus::Cancelled;
        cancelled.closed_at = Some(Utc::now());

        self.store
            .commit(vec![WriteOp::PutTrade(cancelled)])
            .await
            .map_err(EngineError::TradeExecution)?;

        tracing::info!(account = %account_id, trade = %trade_id, "Pending order cancelled.");
        Ok(())
    }

    /// Derives the account's risk metrics from the ledger and a caller-
    /// supplied price snapshot.
    pub async fn account_metrics(
        &self,
        account_id: &str,
        live_prices: &HashMap<String, Decimal>,
    ) -> Result<AccountMetrics, EngineError> {
        let account = self.store.account(account_id).await.map_err(fetch_err)?;
        let positions = self.store.positions(account_id).await.map_err(fetch_err)?;
        Ok(compute_metrics(&account, &positions, live_prices)?)
    }

    /// Marks every open trade to the supplied price snapshot.
    pub async fn positions(
        &self,
        account_id: &str,
        live_prices: &HashMap<String, Decimal>,
    ) -> Result<Vec<PositionView>, EngineError> {
        let open_trades = self
            .store
            .open_trades(account_id)
            .await
            .map_err(fetch_err)?;

        let mut views = Vec::with_capacity(open_trades.len());
        for trade in open_trades {
            let price = *live_prices
                .get(&trade.symbol)
                .ok_or_else(|| RiskError::MissingPrice(trade.symbol.clone()))?;
            let unrealized_pnl =
                margin::calculate_pnl(trade.side, trade.price_per_unit, price, trade.units);
            views.push(PositionView {
                trade_id: trade.id,
                symbol: trade.symbol,
                side: trade.side,
                units: trade.units,
                entry_price: trade.price_per_unit,
                current_price: price,
                position_value: trade.units * price,
                margin_used: trade.margin_reserved,
                unrealized_pnl,
                pnl_percentage: margin::pnl_percentage(
                    unrealized_pnl,
                    trade.price_per_unit,
                    trade.units,
                ),
                stop_loss: trade.stop_loss,
                take_profit: trade.take_profit,
                status: trade.status,
                opened_at: trade.executed_at,
            });
        }
        Ok(views)
    }

    /// The weighted-average ledger rows, revalued at the supplied snapshot.
    /// Symbols missing from the snapshot keep their last marked price.
    pub async fn portfolio_ledger(
        &self,
        account_id: &str,
        live_prices: &HashMap<String, Decimal>,
    ) -> Result<Vec<PortfolioPosition>, EngineError> {
        let positions = self.store.positions(account_id).await.map_err(fetch_err)?;
        Ok(positions
            .iter()
            .map(|position| {
                let price = live_prices
                    .get(&position.symbol)
                    .copied()
                    .unwrap_or(position.current_price);
                mark_to_market(position, price)
            })
            .collect())
    }

    /// Full trade history for an account, placement order preserved.
    pub async fn trade_history(&self, account_id: &str) -> Result<Vec<Trade>, EngineError> {
        self.store.trades(account_id).await.map_err(fetch_err)
    }
}

fn validate_order(request: &OrderRequest) -> Result<(), EngineError> {
    let invalid = |field: &str, reason: &str| EngineError::Validation {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    if request.symbol.trim().is_empty() {
        return Err(invalid("symbol", "symbol must not be empty"));
    }
    if request.units <= Decimal::ZERO {
        return Err(invalid("units", "units must be greater than zero"));
    }
    if request.price <= Decimal::ZERO {
        return Err(invalid("price", "price must be greater than zero"));
    }
    if let Some(stop_loss) = request.stop_loss {
        if stop_loss <= Decimal::ZERO {
            return Err(invalid("stop_loss", "stop loss must be greater than zero"));
        }
    }
    if let Some(take_profit) = request.take_profit {
        if take_profit <= Decimal::ZERO {
            return Err(invalid(
                "take_profit",
                "take profit must be greater than zero",
            ));
        }
    }
    if request.expiration_date.is_some() && !request.order_type.is_entry() {
        return Err(invalid(
            "expiration_date",
            "only entry orders may carry an expiration date",
        ));
    }
    Ok(())
}
