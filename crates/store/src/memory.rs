use crate::error::StoreError;
use crate::{TradeStore, WriteBatch, WriteOp};
use async_trait::async_trait;
use core_types::{Account, OrderStatus, PortfolioPosition, Trade};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    trades: HashMap<Uuid, Trade>,
    // Keyed by (account_id, symbol); at most one live row per key.
    positions: HashMap<(String, String), PortfolioPosition>,
    // Preserves placement order for `trades()` queries.
    trade_order: Vec<Uuid>,
}

/// The in-memory reference implementation of `TradeStore`.
///
/// All tables sit behind a single `RwLock`, so a `commit` takes the write
/// guard once and applies the whole batch under it. Readers see either none
/// of a batch or all of it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a freshly provisioned account record. Intended for startup and
    /// tests; runtime mutation goes through `commit`.
    pub async fn seed_account(&self, account: Account) {
        let mut tables = self.tables.write().await;
        tables.accounts.insert(account.account_id.clone(), account);
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn account(&self, account_id: &str) -> Result<Account, StoreError> {
        let tables = self.tables.read().await;
        tables
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| StoreError::AccountNotFound(account_id.to_string()))
    }

    async fn trade(&self, trade_id: Uuid) -> Result<Trade, StoreError> {
        let tables = self.tables.read().await;
        tables
            .trades
            .get(&trade_id)
            .cloned()
            .ok_or_else(|| StoreError::TradeNotFound(trade_id.to_string()))
    }

    async fn trades(&self, account_id: &str) -> Result<Vec<Trade>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .trade_order
            .iter()
            .filter_map(|id| tables.trades.get(id))
            .filter(|trade| trade.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn open_trades(&self, account_id: &str) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades(account_id).await?;
        Ok(trades
            .into_iter()
            .filter(|trade| trade.status == OrderStatus::Open)
            .collect())
    }

    async fn position(
        &self,
        account_id: &str,
        symbol: &str,
    ) -> Result<Option<PortfolioPosition>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .positions
            .get(&(account_id.to_string(), symbol.to_string()))
            .cloned())
    }

    async fn positions(&self, account_id: &str) -> Result<Vec<PortfolioPosition>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .positions
            .values()
            .filter(|position| position.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        for op in batch {
            match op {
                WriteOp::PutAccount(account) => {
                    tables.accounts.insert(account.account_id.clone(), account);
                }
                WriteOp::PutTrade(trade) => {
                    if !tables.trades.contains_key(&trade.id) {
                        tables.trade_order.push(trade.id);
                    }
                    tables.trades.insert(trade.id, trade);
                }
                WriteOp::PutPosition(position) => {
                    tables.positions.insert(
                        (position.account_id.clone(), position.symbol.clone()),
                        position,
                    );
                }
                WriteOp::DeletePosition { account_id, symbol } => {
                    tables.positions.remove(&(account_id, symbol));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{AssetClass, OrderSide, OrderType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_trade(account_id: &str, status: OrderStatus) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            symbol: "EURUSD".to_string(),
            asset_class: AssetClass::Forex,
            side: OrderSide::Buy,
            units: dec!(1000),
            price_per_unit: dec!(1.1),
            order_type: OrderType::Market,
            status,
            margin_reserved: dec!(2.2),
            stop_loss: None,
            take_profit: None,
            expiration_date: None,
            executed_at: Some(Utc::now()),
            closed_at: None,
            pnl: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.account("ghost").await,
            Err(StoreError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn commit_applies_every_op_in_the_batch() {
        let store = MemoryStore::new();
        store
            .seed_account(Account::new("acct-1", dec!(10000), dec!(100)))
            .await;

        let trade = sample_trade("acct-1", OrderStatus::Open);
        let trade_id = trade.id;
        let mut account = store.account("acct-1").await.unwrap();
        account.used_margin = dec!(2.2);

        store
            .commit(vec![WriteOp::PutTrade(trade), WriteOp::PutAccount(account)])
            .await
            .unwrap();

        assert_eq!(store.trade(trade_id).await.unwrap().id, trade_id);
        assert_eq!(store.account("acct-1").await.unwrap().used_margin, dec!(2.2));
    }

    #[tokio::test]
    async fn open_trades_filters_by_status_and_account() {
        let store = MemoryStore::new();
        let open = sample_trade("acct-1", OrderStatus::Open);
        let pending = sample_trade("acct-1", OrderStatus::Pending);
        let other = sample_trade("acct-2", OrderStatus::Open);

        store
            .commit(vec![
                WriteOp::PutTrade(open.clone()),
                WriteOp::PutTrade(pending),
                WriteOp::PutTrade(other),
            ])
            .await
            .unwrap();

        let open_trades = store.open_trades("acct-1").await.unwrap();
        assert_eq!(open_trades.len(), 1);
        assert_eq!(open_trades[0].id, open.id);
        assert_eq!(store.trades("acct-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_position_removes_only_that_key() {
        let store = MemoryStore::new();
        let position = PortfolioPosition {
            position_id: Uuid::new_v4(),
            account_id: "acct-1".to_string(),
            symbol: "EURUSD".to_string(),
            market_type: AssetClass::Forex,
            side: OrderSide::Buy,
            units: dec!(1000),
            average_price: dec!(1.1),
            current_price: dec!(1.1),
            total_value: dec!(1100),
            pnl: Decimal::ZERO,
            pnl_percentage: Decimal::ZERO,
            opened_at: Utc::now(),
            last_updated: Utc::now(),
        };
        store
            .commit(vec![WriteOp::PutPosition(position)])
            .await
            .unwrap();
        assert!(store.position("acct-1", "EURUSD").await.unwrap().is_some());

        store
            .commit(vec![WriteOp::DeletePosition {
                account_id: "acct-1".to_string(),
                symbol: "EURUSD".to_string(),
            }])
            .await
            .unwrap();
        assert!(store.position("acct-1", "EURUSD").await.unwrap().is_none());
    }
}
