use crate::error::RiskError;
use core_types::{Account, PortfolioPosition};
use margin::calculate_pnl;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point-in-time snapshot of an account's health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountMetrics {
    pub balance: Decimal,
    pub equity: Decimal,
    pub used_margin: Decimal,
    pub free_margin: Decimal,
    /// Equity as a percentage of used margin. `None` means the account has
    /// no margin in use and the level is unconstrained; we never divide by
    /// zero to manufacture a number here.
    pub margin_level: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub total_positions: usize,
    pub margin_call_level: Decimal,
    pub is_margin_call: bool,
}

/// Folds the open ledger rows and a price snapshot into account metrics.
///
/// Unrealized P&L values each row from its weighted-average entry price to
/// the supplied live price. `used_margin` is taken from the account's running
/// reservation counter, not recomputed from positions.
pub fn compute_metrics(
    account: &Account,
    positions: &[PortfolioPosition],
    live_prices: &HashMap<String, Decimal>,
) -> Result<AccountMetrics, RiskError> {
    let mut unrealized_pnl = Decimal::ZERO;
    for position in positions {
        let price = live_prices
            .get(&position.symbol)
            .ok_or_else(|| RiskError::MissingPrice(position.symbol.clone()))?;
        unrealized_pnl += calculate_pnl(
            position.side,
            position.average_price,
            *price,
            position.units,
        );
    }

    let equity = account.balance + unrealized_pnl;
    let used_margin = account.used_margin;
    let free_margin = equity - used_margin;

    let margin_level = if used_margin.is_zero() {
        None
    } else {
        Some(equity / used_margin * dec!(100))
    };

    let is_margin_call = match margin_level {
        Some(level) => level <= account.margin_call_level,
        None => false,
    };

    Ok(AccountMetrics {
        balance: account.balance,
        equity,
        used_margin,
        free_margin,
        margin_level,
        unrealized_pnl,
        realized_pnl: account.realized_pnl,
        total_positions: positions.len(),
        margin_call_level: account.margin_call_level,
        is_margin_call,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{AssetClass, OrderSide};
    use uuid::Uuid;

    fn account(balance: Decimal, used_margin: Decimal) -> Account {
        let mut account = Account::new("acct-1", balance, dec!(100));
        account.used_margin = used_margin;
        account.available_funds = balance - used_margin;
        account
    }

    fn position(symbol: &str, side: OrderSide, units: Decimal, avg: Decimal) -> PortfolioPosition {
        PortfolioPosition {
            position_id: Uuid::new_v4(),
            account_id: "acct-1".to_string(),
            symbol: symbol.to_string(),
            market_type: AssetClass::Crypto,
            side,
            units,
            average_price: avg,
            current_price: avg,
            total_value: units * avg,
            pnl: Decimal::ZERO,
            pnl_percentage: Decimal::ZERO,
            opened_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn equity_is_balance_plus_unrealized() {
        let account = account(dec!(10000), dec!(500));
        let positions = vec![position("BTCUSD", OrderSide::Buy, dec!(1), dec!(30000))];
        let prices = HashMap::from([("BTCUSD".to_string(), dec!(30250))]);

        let metrics = compute_metrics(&account, &positions, &prices).unwrap();
        assert_eq!(metrics.unrealized_pnl, dec!(250));
        assert_eq!(metrics.equity, dec!(10250));
        assert_eq!(metrics.free_margin, dec!(9750));
        assert_eq!(metrics.total_positions, 1);
    }

    #[test]
    fn zero_used_margin_means_unconstrained_level() {
        // Even with deeply negative equity there is no margin call while
        // nothing is reserved.
        let mut account = account(dec!(-5000), Decimal::ZERO);
        account.realized_pnl = dec!(-15000);

        let metrics = compute_metrics(&account, &[], &HashMap::new()).unwrap();
        assert_eq!(metrics.margin_level, None);
        assert!(!metrics.is_margin_call);
    }

    #[test]
    fn margin_call_fires_at_the_configured_level() {
        let account = account(dec!(1000), dec!(1000));
        // Equity 1000 against 1000 used margin: level exactly 100%.
        let metrics = compute_metrics(&account, &[], &HashMap::new()).unwrap();
        assert_eq!(metrics.margin_level, Some(dec!(100)));
        assert!(metrics.is_margin_call);
    }

    #[test]
    fn healthy_account_is_not_in_margin_call() {
        let account = account(dec!(10000), dec!(100));
        let metrics = compute_metrics(&account, &[], &HashMap::new()).unwrap();
        assert_eq!(metrics.margin_level, Some(dec!(10000)));
        assert!(!metrics.is_margin_call);
    }

    #[test]
    fn missing_price_is_reported() {
        let account = account(dec!(10000), dec!(500));
        let positions = vec![position("ETHUSD", OrderSide::Sell, dec!(2), dec!(2000))];
        let result = compute_metrics(&account, &positions, &HashMap::new());
        assert!(matches!(result, Err(RiskError::MissingPrice(symbol)) if symbol == "ETHUSD"));
    }

    #[test]
    fn short_positions_gain_when_price_falls() {
        let account = account(dec!(10000), dec!(400));
        let positions = vec![position("ETHUSD", OrderSide::Sell, dec!(2), dec!(2000))];
        let prices = HashMap::from([("ETHUSD".to_string(), dec!(1900))]);

        let metrics = compute_metrics(&account, &positions, &prices).unwrap();
        assert_eq!(metrics.unrealized_pnl, dec!(200));
        assert_eq!(metrics.equity, dec!(10200));
    }
}
