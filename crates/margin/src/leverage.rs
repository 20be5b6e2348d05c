use core_types::AssetClass;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The immutable leverage/margin configuration for one asset class.
///
/// `margin_rate` is the authoritative figure; `max_leverage` is its
/// reciprocal, carried alongside for display and API responses. The pairing
/// is fixed at compile time and verified by test, so the two can never be
/// configured independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageRule {
    pub max_leverage: Decimal,
    pub margin_rate: Decimal,
}

/// The rule applied when an asset class cannot be recognised: 10x leverage,
/// 10% margin. This is the most conservative row of the table and is a
/// deliberate policy choice: an unclassifiable instrument is margined like
/// crypto, not like forex, and certainly not at a silent rate of 1.0.
pub const CONSERVATIVE_RULE: LeverageRule = LeverageRule {
    max_leverage: dec!(10),
    margin_rate: dec!(0.10),
};

/// Returns the fixed leverage/margin rule for an asset class.
pub fn leverage_rule(asset_class: AssetClass) -> LeverageRule {
    match asset_class {
        AssetClass::Forex => LeverageRule {
            max_leverage: dec!(500),
            margin_rate: dec!(0.002),
        },
        AssetClass::Indices => LeverageRule {
            max_leverage: dec!(200),
            margin_rate: dec!(0.005),
        },
        AssetClass::Stocks => LeverageRule {
            max_leverage: dec!(20),
            margin_rate: dec!(0.05),
        },
        AssetClass::Commodities => LeverageRule {
            max_leverage: dec!(100),
            margin_rate: dec!(0.01),
        },
        AssetClass::Crypto => LeverageRule {
            max_leverage: dec!(10),
            margin_rate: dec!(0.10),
        },
    }
}

/// Resolves a rule from a raw asset-class name at the wire boundary.
///
/// Unknown names are not rejected: they fall back to `CONSERVATIVE_RULE` and
/// are logged, so a caller sending a class this engine has never heard of is
/// quoted the most cautious margin instead of an error.
pub fn rule_for_class_name(name: &str) -> LeverageRule {
    match AssetClass::from_str(name) {
        Ok(class) => leverage_rule(class),
        Err(_) => {
            tracing::warn!(
                asset_class = %name,
                "Unknown asset class; applying conservative 10x margin rule."
            );
            CONSERVATIVE_RULE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_published_rates() {
        assert_eq!(leverage_rule(AssetClass::Forex).margin_rate, dec!(0.002));
        assert_eq!(leverage_rule(AssetClass::Indices).margin_rate, dec!(0.005));
        assert_eq!(leverage_rule(AssetClass::Stocks).margin_rate, dec!(0.05));
        assert_eq!(
            leverage_rule(AssetClass::Commodities).margin_rate,
            dec!(0.01)
        );
        assert_eq!(leverage_rule(AssetClass::Crypto).margin_rate, dec!(0.10));
    }

    #[test]
    fn leverage_is_reciprocal_of_margin_rate_for_every_class() {
        for class in AssetClass::ALL {
            let rule = leverage_rule(class);
            assert_eq!(
                Decimal::ONE / rule.margin_rate,
                rule.max_leverage,
                "leverage and margin rate disagree for {class}"
            );
        }
    }

    #[test]
    fn unknown_class_falls_back_to_conservative_rule() {
        let rule = rule_for_class_name("BASEBALL_CARDS");
        assert_eq!(rule, CONSERVATIVE_RULE);
        assert_eq!(rule.margin_rate, dec!(0.10));
    }

    #[test]
    fn known_class_names_resolve_to_table_rows() {
        assert_eq!(rule_for_class_name("FOREX").max_leverage, dec!(500));
        assert_eq!(rule_for_class_name("indices").max_leverage, dec!(200));
    }
}
