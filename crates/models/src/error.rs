use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid odds: {0}")]
    InvalidOdds(String),

    #[error("Invalid stake amount: {amount}")]
    InvalidStake { amount: String },

    #[error("Invalid outcome transition: {reason}")]
    InvalidOutcome { reason: String },

    #[error("Bet not found: {id}")]
    BetNotFound { id: i64 },

    #[error("Bookie not found: {id}")]
    BookieNotFound { id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
