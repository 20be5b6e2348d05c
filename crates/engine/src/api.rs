//! The `{success, message, ...}` envelopes of the outer request/response
//! contract. Lifecycle results are converted here so that no `EngineError`
//! ever crosses the engine boundary as a panic or a raw error value.

use crate::error::EngineError;
use crate::{CloseReceipt, OrderReceipt};
use core_types::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_required: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub message: String,
}

impl From<Result<OrderReceipt, EngineError>> for PlaceOrderResponse {
    fn from(result: Result<OrderReceipt, EngineError>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                order_id: Some(receipt.order_id),
                execution_price: receipt.execution_price,
                margin_required: Some(receipt.margin_required),
                status: Some(receipt.status),
                error: None,
                message: match receipt.status {
                    OrderStatus::Pending => "Order placed and awaiting trigger".to_string(),
                    _ => "Order executed".to_string(),
                },
            },
            Err(error) => Self::failure(error),
        }
    }
}

impl PlaceOrderResponse {
    fn failure(error: EngineError) -> Self {
        Self {
            success: false,
            order_id: None,
            execution_price: None,
            margin_required: None,
            status: None,
            error: Some(error.kind()),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosePositionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_released: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub message: String,
}

impl From<Result<CloseReceipt, EngineError>> for ClosePositionResponse {
    fn from(result: Result<CloseReceipt, EngineError>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                close_price: Some(receipt.close_price),
                pnl: Some(receipt.pnl),
                margin_released: Some(receipt.margin_released),
                error: None,
                message: "Position closed".to_string(),
            },
            Err(error) => Self {
                success: false,
                close_price: None,
                pnl: None,
                margin_released: None,
                error: Some(error.kind()),
                message: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelOrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub message: String,
}

impl From<Result<(), EngineError>> for CancelOrderResponse {
    fn from(result: Result<(), EngineError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
                message: "Order cancelled".to_string(),
            },
            Err(error) => Self {
                success: false,
                error: Some(error.kind()),
                message: error.to_string(),
            },
        }
    }
}
