//! Error taxonomy for wallet, contract and API operations.

use crate::clarity::ClarityError;
use thiserror::Error;

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("a connection attempt is already in progress")]
    ConnectInProgress,

    #[error("failed to establish wallet session: {0}")]
    ConnectionFailed(String),

    #[error("could not determine Stacks address from wallet")]
    AddressUnavailable,

    #[error("wallet not connected")]
    NotConnected,

    #[error("wallet request {method} failed: {message}")]
    Remote { method: String, message: String },

    #[error("provider: {0}")]
    Provider(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("clarity: {0}")]
    Clarity(#[from] ClarityError),

    #[error("api: {0}")]
    Api(String),

    #[error("config: {0}")]
    Config(String),
}

impl WalletError {
    pub fn remote(method: &str, message: impl ToString) -> Self {
        Self::Remote { method: method.to_string(), message: message.to_string() }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        WalletError::Api(e.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(e: serde_json::Error) -> Self {
        WalletError::Api(format!("json: {e}"))
    }
}
