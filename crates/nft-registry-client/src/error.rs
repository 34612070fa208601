//! Error type for everything the client does off-chain.

use anchor_lang::prelude::Pubkey;
use nft_registry::errors::RegistryError;
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// A program-level failure: registry error codes and Anchor framework codes.
    #[error("program error: {0}")]
    Program(#[from] anchor_lang::error::Error),

    /// A token or token-metadata step failed.
    #[error("subsystem call failed: {0}")]
    Subsystem(String),

    #[error("rpc error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("failed to decode account {address}: {reason}")]
    Decode { address: Pubkey, reason: String },

    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),
}

impl ClientError {
    /// True when this is the given registry error code.
    pub fn is_registry(&self, expected: RegistryError) -> bool {
        self.error_code() == Some(u32::from(expected))
    }

    pub fn error_code(&self) -> Option<u32> {
        match self {
            ClientError::Program(anchor_lang::error::Error::AnchorError(err)) => {
                Some(err.error_code_number)
            }
            _ => None,
        }
    }
}

impl From<RegistryError> for ClientError {
    fn from(err: RegistryError) -> Self {
        ClientError::Program(err.into())
    }
}
