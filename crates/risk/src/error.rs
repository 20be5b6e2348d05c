use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Missing market price for symbol: {0}")]
    MissingPrice(String),
}
