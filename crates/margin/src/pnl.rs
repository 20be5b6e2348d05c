use core_types::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Computes profit-and-loss for a position between two prices.
///
/// Used for live unrealized valuation (exit = current market price) and for
/// final settlement (exit = close price). A long gains when price rises, a
/// short gains when price falls.
pub fn calculate_pnl(
    side: OrderSide,
    entry_price: Decimal,
    exit_price: Decimal,
    units: Decimal,
) -> Decimal {
    match side {
        OrderSide::Buy => (exit_price - entry_price) * units,
        OrderSide::Sell => (entry_price - exit_price) * units,
    }
}

/// P&L expressed as a percentage of the position's entry value.
/// Zero when the entry value is zero, so it never divides by zero.
pub fn pnl_percentage(pnl: Decimal, entry_price: Decimal, units: Decimal) -> Decimal {
    let entry_value = entry_price * units;
    if entry_value.is_zero() {
        return Decimal::ZERO;
    }
    pnl / entry_value * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_gains_when_price_rises() {
        let pnl = calculate_pnl(OrderSide::Buy, dec!(1.1000), dec!(1.1050), dec!(1000));
        assert_eq!(pnl, dec!(5.00));
    }

    #[test]
    fn short_gains_when_price_falls() {
        let pnl = calculate_pnl(OrderSide::Sell, dec!(100), dec!(90), dec!(5));
        assert_eq!(pnl, dec!(50));
    }

    #[test]
    fn flat_exit_is_zero_for_both_sides() {
        assert_eq!(
            calculate_pnl(OrderSide::Buy, dec!(42.5), dec!(42.5), dec!(7)),
            Decimal::ZERO
        );
        assert_eq!(
            calculate_pnl(OrderSide::Sell, dec!(42.5), dec!(42.5), dec!(7)),
            Decimal::ZERO
        );
    }

    #[test]
    fn percentage_of_entry_value() {
        let pnl = calculate_pnl(OrderSide::Buy, dec!(100), dec!(110), dec!(10));
        assert_eq!(pnl_percentage(pnl, dec!(100), dec!(10)), dec!(10));
    }

    #[test]
    fn percentage_is_zero_when_entry_value_is_zero() {
        assert_eq!(
            pnl_percentage(dec!(5), Decimal::ZERO, dec!(10)),
            Decimal::ZERO
        );
    }
}
