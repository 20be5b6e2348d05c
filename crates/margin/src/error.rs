use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarginError {
    #[error("Invalid units for margin calculation: {0} (must be greater than zero)")]
    InvalidUnits(String),

    #[error("Invalid price for margin calculation: {0} (must be greater than zero)")]
    InvalidPrice(String),
}
