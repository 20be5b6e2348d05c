use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Invalid quantity for reducing position. Requested: {requested}, Held: {held}")]
    InvalidClosingQuantity { requested: String, held: String },
}
