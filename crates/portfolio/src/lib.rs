//! # Meridian Portfolio Crate
//!
//! Maintains the weighted-average-cost ledger: at most one
//! `PortfolioPosition` row per (account, symbol) while units remain open.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** These functions are pure state
//!   transitions over ledger rows. They never touch storage; the `engine`
//!   crate reads the current row, applies a transition, and commits the
//!   result in the same atomic batch as the trade and account writes.
//! - **Cost Basis Discipline:** The average price moves only when units are
//!   accumulated. Partial exits and mark-to-market leave it untouched, which
//!   is what keeps downstream P&L displays honest.

pub mod aggregator;
pub mod error;

pub use aggregator::{mark_to_market, merge_open, reduce_on_close, POSITION_EPSILON};
pub use error::PortfolioError;
