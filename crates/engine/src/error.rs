use core_types::OrderStatus;
use margin::MarginError;
use portfolio::PortfolioError;
use risk::RiskError;
use rust_decimal::Decimal;
use store::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Insufficient funds: required margin {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Order {trade_id} is '{status}' and cannot be {attempted}")]
    OrderStateConflict {
        trade_id: Uuid,
        status: OrderStatus,
        attempted: &'static str,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Trade execution failed: {0}")]
    TradeExecution(#[source] StoreError),

    #[error("Margin calculation error: {0}")]
    Margin(#[from] MarginError),

    #[error("Portfolio state error: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Risk metrics error: {0}")]
    Risk(#[from] RiskError),
}

impl EngineError {
    /// The stable failure-taxonomy tag carried on response envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } | EngineError::Margin(_) => "validation_error",
            EngineError::InsufficientFunds { .. } => "insufficient_funds",
            EngineError::OrderStateConflict { .. } => "order_state_conflict",
            EngineError::NotFound(_) => "not_found",
            EngineError::TradeExecution(_) | EngineError::Portfolio(_) => {
                "trade_execution_failure"
            }
            EngineError::Risk(_) => "validation_error",
        }
    }
}

/// Maps a read-path store failure. Lookups that miss are the caller's
/// problem; anything else is an execution failure.
pub(crate) fn fetch_err(error: StoreError) -> EngineError {
    match error {
        StoreError::AccountNotFound(id) => EngineError::NotFound(format!("account {id}")),
        StoreError::TradeNotFound(id) => EngineError::NotFound(format!("trade {id}")),
        other => EngineError::TradeExecution(other),
    }
}
