use crate::error::PortfolioError;
use chrono::Utc;
use core_types::{AssetClass, OrderSide, PortfolioPosition};
use margin::{calculate_pnl, pnl_percentage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Residual units within this distance of zero are treated as a full close
/// and the ledger row is removed.
pub const POSITION_EPSILON: Decimal = dec!(0.0001);

/// Merges a newly opened trade into the ledger.
///
/// The first trade for a symbol creates the row; subsequent trades blend the
/// average price by cost: `(old_avg * old_units + price * units) / total`.
/// The row's side is fixed by the first trade that created it.
pub fn merge_open(
    existing: Option<&PortfolioPosition>,
    account_id: &str,
    symbol: &str,
    market_type: AssetClass,
    side: OrderSide,
    new_units: Decimal,
    new_price: Decimal,
) -> PortfolioPosition {
    let now = Utc::now();

    match existing {
        None => PortfolioPosition {
            position_id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            market_type,
            side,
            units: new_units,
            average_price: new_price,
            current_price: new_price,
            total_value: new_units * new_price,
            pnl: Decimal::ZERO,
            pnl_percentage: Decimal::ZERO,
            opened_at: now,
            last_updated: now,
        },
        Some(position) => {
            let total_units = position.units + new_units;
            let average_price = (position.average_price * position.units
                + new_price * new_units)
                / total_units;

            let mut merged = position.clone();
            merged.units = total_units;
            merged.average_price = average_price;
            merged.current_price = new_price;
            merged.total_value = total_units * new_price;
            merged.pnl = calculate_pnl(merged.side, average_price, new_price, total_units);
            merged.pnl_percentage = pnl_percentage(merged.pnl, average_price, total_units);
            merged.last_updated = now;
            merged
        }
    }
}

/// Reduces the ledger row after a close, or removes it entirely.
///
/// Returns `Ok(None)` when the residual units fall within `POSITION_EPSILON`
/// of zero. On a partial exit the average price is deliberately left
/// untouched: the cost basis of the remaining units is unaffected.
pub fn reduce_on_close(
    position: &PortfolioPosition,
    closed_units: Decimal,
    current_price: Decimal,
) -> Result<Option<PortfolioPosition>, PortfolioError> {
    if closed_units > position.units + POSITION_EPSILON {
        return Err(PortfolioError::InvalidClosingQuantity {
            requested: closed_units.to_string(),
            held: position.units.to_string(),
        });
    }

    if (position.units - closed_units).abs() < POSITION_EPSILON {
        return Ok(None);
    }

    let remaining = position.units - closed_units;
    let mut reduced = position.clone();
    reduced.units = remaining;
    reduced.current_price = current_price;
    reduced.total_value = remaining * current_price;
    reduced.pnl = calculate_pnl(reduced.side, reduced.average_price, current_price, remaining);
    reduced.pnl_percentage = pnl_percentage(reduced.pnl, reduced.average_price, remaining);
    reduced.last_updated = Utc::now();
    Ok(Some(reduced))
}

/// Revalues a ledger row at a fresh price snapshot without changing its
/// units or cost basis.
pub fn mark_to_market(position: &PortfolioPosition, price: Decimal) -> PortfolioPosition {
    let mut marked = position.clone();
    marked.current_price = price;
    marked.total_value = marked.units * price;
    marked.pnl = calculate_pnl(marked.side, marked.average_price, price, marked.units);
    marked.pnl_percentage = pnl_percentage(marked.pnl, marked.average_price, marked.units);
    marked.last_updated = Utc::now();
    marked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(units: Decimal, price: Decimal) -> PortfolioPosition {
        merge_open(
            None,
            "acct-1",
            "BTCUSD",
            AssetClass::Crypto,
            OrderSide::Buy,
            units,
            price,
        )
    }

    #[test]
    fn first_trade_creates_row_at_entry_price() {
        let position = open(dec!(2), dec!(30000));
        assert_eq!(position.units, dec!(2));
        assert_eq!(position.average_price, dec!(30000));
        assert_eq!(position.total_value, dec!(60000));
        assert_eq!(position.pnl, Decimal::ZERO);
    }

    #[test]
    fn accumulation_blends_average_price_by_cost() {
        let first = open(dec!(100), dec!(10));
        let merged = merge_open(
            Some(&first),
            "acct-1",
            "BTCUSD",
            AssetClass::Crypto,
            OrderSide::Buy,
            dec!(100),
            dec!(20),
        );
        assert_eq!(merged.units, dec!(200));
        assert_eq!(merged.average_price, dec!(15));
        assert_eq!(merged.current_price, dec!(20));
        assert_eq!(merged.total_value, dec!(4000));
    }

    #[test]
    fn partial_reduction_keeps_average_price() {
        let position = open(dec!(100), dec!(10));
        let reduced = reduce_on_close(&position, dec!(40), dec!(12))
            .unwrap()
            .expect("position should survive a partial close");
        assert_eq!(reduced.units, dec!(60));
        assert_eq!(reduced.average_price, dec!(10));
        assert_eq!(reduced.total_value, dec!(720));
    }

    #[test]
    fn full_reduction_removes_the_row() {
        let position = open(dec!(100), dec!(10));
        assert!(reduce_on_close(&position, dec!(100), dec!(12))
            .unwrap()
            .is_none());
    }

    #[test]
    fn residual_dust_below_epsilon_counts_as_full_close() {
        let position = open(dec!(100), dec!(10));
        assert!(reduce_on_close(&position, dec!(99.99995), dec!(12))
            .unwrap()
            .is_none());
    }

    #[test]
    fn over_reduction_is_rejected() {
        let position = open(dec!(10), dec!(10));
        assert!(matches!(
            reduce_on_close(&position, dec!(11), dec!(12)),
            Err(PortfolioError::InvalidClosingQuantity { .. })
        ));
    }

    #[test]
    fn mark_to_market_never_moves_cost_basis() {
        let position = open(dec!(10), dec!(100));
        let marked = mark_to_market(&position, dec!(110));
        assert_eq!(marked.average_price, dec!(100));
        assert_eq!(marked.units, dec!(10));
        assert_eq!(marked.total_value, dec!(1100));
        assert_eq!(marked.pnl, dec!(100));
        assert_eq!(marked.pnl_percentage, dec!(10));
    }
}
