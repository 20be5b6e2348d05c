//! # Meridian Store Crate
//!
//! The persistence seam of the engine. `TradeStore` is an abstract,
//! transactional key-value view over the three logical tables the engine
//! needs: one account record per user, an append-only trade table keyed by
//! id, and a portfolio table keyed by (account, symbol).
//!
//! ## Architectural Principles
//!
//! - **Atomic Batches:** Every lifecycle operation commits all of its writes
//!   (trade, account, portfolio) as a single `WriteBatch`. A conforming
//!   implementation applies the whole batch or none of it, so a mid-sequence
//!   failure can never leave the ledger half-updated.
//! - **Store Agnosticism:** Nothing above this crate knows whether records
//!   live in memory, Postgres, or anywhere else. `MemoryStore` is the
//!   reference implementation and the test double.

pub mod error;
pub mod memory;

use async_trait::async_trait;
use core_types::{Account, PortfolioPosition, Trade};
use uuid::Uuid;

pub use error::StoreError;
pub use memory::MemoryStore;

/// A single write in an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    PutAccount(Account),
    PutTrade(Trade),
    PutPosition(PortfolioPosition),
    DeletePosition { account_id: String, symbol: String },
}

/// The writes of one lifecycle operation, applied all-or-nothing.
pub type WriteBatch = Vec<WriteOp>;

/// The abstract transactional store the engine is specified against.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Fetches the account record for a user.
    async fn account(&self, account_id: &str) -> Result<Account, StoreError>;

    /// Fetches a single trade by id.
    async fn trade(&self, trade_id: Uuid) -> Result<Trade, StoreError>;

    /// Fetches every trade ever placed on an account, newest last.
    async fn trades(&self, account_id: &str) -> Result<Vec<Trade>, StoreError>;

    /// Fetches the trades currently in the open state for an account.
    async fn open_trades(&self, account_id: &str) -> Result<Vec<Trade>, StoreError>;

    /// Fetches the ledger row for (account, symbol), if one is live.
    async fn position(
        &self,
        account_id: &str,
        symbol: &str,
    ) -> Result<Option<PortfolioPosition>, StoreError>;

    /// Fetches every live ledger row for an account.
    async fn positions(&self, account_id: &str) -> Result<Vec<PortfolioPosition>, StoreError>;

    /// Applies a batch of writes atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
