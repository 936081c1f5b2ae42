use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Column '{symbol}' has {actual} values but the calendar has {expected} dates")]
    ShapeMismatch {
        symbol: String,
        expected: usize,
        actual: usize,
    },
}
