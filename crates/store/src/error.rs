use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("The store rejected a write batch: {0}")]
    CommitFailed(String),
}
