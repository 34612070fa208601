//! Client configuration.
//!
//! Nothing here reads the environment; callers build a config explicitly.

use solana_sdk::commitment_config::CommitmentConfig;

use crate::query::MAX_FETCH_BATCH;

pub const LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    /// Records fetched per page in the second query phase.
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: LOCALNET_RPC_URL.to_string(),
            commitment: CommitmentConfig::confirmed(),
            page_size: 25,
        }
    }
}

impl ClientConfig {
    pub fn devnet() -> Self {
        Self {
            rpc_url: DEVNET_RPC_URL.to_string(),
            ..Self::default()
        }
    }

    /// Page sizes are clamped to what one `getMultipleAccounts` call accepts.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_FETCH_BATCH);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(ClientConfig::default().with_page_size(0).page_size, 1);
        assert_eq!(ClientConfig::default().with_page_size(10_000).page_size, MAX_FETCH_BATCH);
        assert_eq!(ClientConfig::devnet().with_page_size(40).page_size, 40);
    }
}
