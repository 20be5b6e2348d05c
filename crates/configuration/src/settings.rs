use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountDefaults,
}

/// Defaults applied when provisioning a fresh account record.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDefaults {
    /// Starting cash balance, fully available for margin until reserved.
    pub initial_balance: Decimal,
    /// The margin-level percentage at or below which the account enters
    /// margin call (e.g. 100 for 100%).
    pub margin_call_level: Decimal,
}

impl Config {
    /// Rejects configurations that would make the engine misbehave silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.initial_balance < Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "account.initial_balance must not be negative".to_string(),
            ));
        }
        if self.account.margin_call_level <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "account.margin_call_level must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
