use crate::error::MarginError;
use crate::leverage::{leverage_rule, rule_for_class_name, LeverageRule};
use core_types::AssetClass;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The fixed-shape result of a margin calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginBreakdown {
    pub position_value: Decimal,
    pub required_margin: Decimal,
    pub leverage: Decimal,
    pub margin_rate: Decimal,
}

/// Computes the notional value and required margin for a prospective trade.
///
/// Pure and deterministic: `position_value = units * price`,
/// `required_margin = position_value * margin_rate(asset_class)`.
pub fn calculate_margin(
    asset_class: AssetClass,
    units: Decimal,
    price: Decimal,
) -> Result<MarginBreakdown, MarginError> {
    breakdown_with_rule(leverage_rule(asset_class), units, price)
}

/// Same calculation, but resolving the asset class from a raw name at the
/// wire boundary. Unknown names are margined under the conservative fallback
/// rule rather than rejected.
pub fn calculate_margin_for_class_name(
    asset_class: &str,
    units: Decimal,
    price: Decimal,
) -> Result<MarginBreakdown, MarginError> {
    breakdown_with_rule(rule_for_class_name(asset_class), units, price)
}

fn breakdown_with_rule(
    rule: LeverageRule,
    units: Decimal,
    price: Decimal,
) -> Result<MarginBreakdown, MarginError> {
    if units <= Decimal::ZERO {
        return Err(MarginError::InvalidUnits(units.to_string()));
    }
    if price <= Decimal::ZERO {
        return Err(MarginError::InvalidPrice(price.to_string()));
    }

    let position_value = units * price;
    Ok(MarginBreakdown {
        position_value,
        required_margin: position_value * rule.margin_rate,
        leverage: rule.max_leverage,
        margin_rate: rule.margin_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn forex_margin_worked_example() {
        // 1,000 units of EURUSD at 1.1000: notional 1,100 at 0.2% margin.
        let breakdown = calculate_margin(AssetClass::Forex, dec!(1000), dec!(1.1000)).unwrap();
        assert_eq!(breakdown.position_value, dec!(1100));
        assert_eq!(breakdown.required_margin, dec!(2.2));
        assert_eq!(breakdown.leverage, dec!(500));
        assert_eq!(breakdown.margin_rate, dec!(0.002));
    }

    #[test]
    fn required_margin_is_positive_for_every_class() {
        for class in AssetClass::ALL {
            let breakdown = calculate_margin(class, dec!(5), dec!(200)).unwrap();
            assert!(breakdown.required_margin > Decimal::ZERO);
            assert_eq!(
                breakdown.required_margin,
                breakdown.position_value * breakdown.margin_rate
            );
            // Both published formulas must agree: value * rate == value / leverage.
            assert_eq!(
                breakdown.required_margin,
                breakdown.position_value / breakdown.leverage
            );
        }
    }

    #[test]
    fn rejects_non_positive_units_and_price() {
        assert!(matches!(
            calculate_margin(AssetClass::Stocks, dec!(0), dec!(100)),
            Err(MarginError::InvalidUnits(_))
        ));
        assert!(matches!(
            calculate_margin(AssetClass::Stocks, dec!(-3), dec!(100)),
            Err(MarginError::InvalidUnits(_))
        ));
        assert!(matches!(
            calculate_margin(AssetClass::Stocks, dec!(10), dec!(0)),
            Err(MarginError::InvalidPrice(_))
        ));
    }

    #[test]
    fn unknown_class_is_quoted_not_rejected() {
        let breakdown = calculate_margin_for_class_name("NFT", dec!(2), dec!(50)).unwrap();
        assert_eq!(breakdown.position_value, dec!(100));
        assert_eq!(breakdown.required_margin, dec!(10));
        assert_eq!(breakdown.leverage, dec!(10));
    }
}
