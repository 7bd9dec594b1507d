//! Error types for the signing core
//!
//! Transaction-signing operations surface a typed [`SignError`]; the
//! message-signing operations collapse every failure into an empty string
//! at the public surface (see `signer`), so these variants only show up on
//! the transaction paths and in logs.

use crate::keystore::KeystoreError;
use thiserror::Error;

/// Errors produced while signing transactions.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("no account matches address {0}")]
    AccountNotFound(String),

    #[error("wrong password or corrupted key entry")]
    WrongPassword,

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("invalid chain id hex: {0}")]
    InvalidChainId(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

pub type SignResult<T> = Result<T, SignError>;

impl From<KeystoreError> for SignError {
    fn from(e: KeystoreError) -> Self {
        match e {
            KeystoreError::WrongPassword => SignError::WrongPassword,
            other => SignError::SigningFailed(other.to_string()),
        }
    }
}
