//! # Meridian Margin Crate
//!
//! This crate provides the pure numeric core of the trading engine: the
//! per-asset-class leverage table, the margin requirement calculator, and the
//! profit-and-loss calculator.
//!
//! ## Architectural Principles
//!
//! - **Purity:** Nothing in this crate performs I/O or mutates state. Every
//!   function maps inputs to outputs deterministically, which is what makes
//!   the order lifecycle in the `engine` crate testable.
//! - **One Authoritative Formula:** The margin rate is the source of truth
//!   for each asset class; the advertised leverage is carried alongside it in
//!   the same rule row and is verified against the rate in tests. Changing
//!   the table means changing the rate, never the two numbers independently.
//!
//! ## Public API
//!
//! - `LeverageRule` / `leverage_rule`: the fixed per-class margin table.
//! - `MarginBreakdown` / `calculate_margin`: position value and required margin.
//! - `calculate_pnl` / `pnl_percentage`: realized and unrealized P&L.

pub mod calculator;
pub mod error;
pub mod leverage;
pub mod pnl;

pub use calculator::{calculate_margin, calculate_margin_for_class_name, MarginBreakdown};
pub use error::MarginError;
pub use leverage::{leverage_rule, rule_for_class_name, LeverageRule, CONSERVATIVE_RULE};
pub use pnl::{calculate_pnl, pnl_percentage};
