//! [`AccountSource`] backed by a cluster's JSON-RPC endpoint.

use anchor_lang::prelude::Pubkey;
use solana_account_decoder_client_types::{UiAccountEncoding, UiDataSliceConfig};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::query::MAX_FETCH_BATCH;
use crate::source::{AccountFilter, AccountSource, DataSlice, KeyedAccount};

pub struct RpcAccountSource {
    client: RpcClient,
}

impl RpcAccountSource {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment),
        }
    }

    pub fn from_client(client: RpcClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

fn to_rpc_filter(filter: &AccountFilter) -> RpcFilterType {
    match filter {
        AccountFilter::Memcmp { offset, bytes } => {
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(*offset, bytes.clone()))
        }
        AccountFilter::DataSize(size) => RpcFilterType::DataSize(*size),
    }
}

fn program_accounts_config(
    filters: &[AccountFilter],
    slice: Option<DataSlice>,
    client: &RpcClient,
) -> RpcProgramAccountsConfig {
    RpcProgramAccountsConfig {
        filters: Some(filters.iter().map(to_rpc_filter).collect()),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            data_slice: slice.map(|slice| UiDataSliceConfig {
                offset: slice.offset,
                length: slice.length,
            }),
            commitment: Some(client.commitment()),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    }
}

impl AccountSource for RpcAccountSource {
    fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        slice: Option<DataSlice>,
    ) -> ClientResult<Vec<KeyedAccount>> {
        let config = program_accounts_config(filters, slice, &self.client);
        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)?;

        debug!(
            program = %program_id,
            filters = filters.len(),
            matched = accounts.len(),
            "getProgramAccounts"
        );

        Ok(accounts
            .into_iter()
            .map(|(address, account)| KeyedAccount {
                address,
                data: account.data,
            })
            .collect())
    }

    fn fetch_many(&self, addresses: &[Pubkey]) -> ClientResult<Vec<Option<Vec<u8>>>> {
        let mut out = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_FETCH_BATCH) {
            let accounts = self.client.get_multiple_accounts(chunk)?;
            debug!(requested = chunk.len(), "getMultipleAccounts");
            out.extend(accounts.into_iter().map(|account| account.map(|a| a.data)));
        }
        Ok(out)
    }
}
