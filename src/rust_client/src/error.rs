use solana_program::pubkey::Pubkey;
use solana_sdk::{signature::Signature, signer::SignerError, transaction::TransactionError};
use std::io;
use token_lock::error::TokenLockError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    TokenLock(#[from] TokenLockError),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Signing error: {0}")]
    Signer(#[from] SignerError),
    #[error("Transaction {0} failed: {1}")]
    TransactionFailed(Signature, TransactionError),
    #[error("Transaction {0} was not confirmed")]
    Unconfirmed(Signature),
    #[error("{signer} is not the program owner {owner}")]
    NotOwner { signer: Pubkey, owner: Pubkey },
    #[error("Config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
