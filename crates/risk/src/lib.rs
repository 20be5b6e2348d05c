//! # Meridian Risk Crate
//!
//! Derives account-level risk metrics from the account record and the set of
//! open ledger rows: equity, used/free margin, margin level, and the
//! margin-call flag that gates further trading.
//!
//! The computation is a pure fold over caller-supplied price snapshots. The
//! crate holds no subscription state and never polls for prices.

pub mod error;
pub mod metrics;

pub use error::RiskError;
pub use metrics::{compute_metrics, AccountMetrics};
