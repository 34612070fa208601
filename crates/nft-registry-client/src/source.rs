//! Read-only view of the ledger's account store.
//!
//! The query layer only ever talks to an [`AccountSource`]: the RPC adapter
//! for a live cluster, or the sandbox ledger in-process.

use anchor_lang::prelude::Pubkey;

use crate::error::ClientResult;

/// Byte-match filter applied to raw account data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    Memcmp { offset: usize, bytes: Vec<u8> },
    DataSize(u64),
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        AccountFilter::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            AccountFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .is_some_and(|window| window == bytes.as_slice()),
            AccountFilter::DataSize(size) => data.len() as u64 == *size,
        }
    }
}

/// Portion of account data returned by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSlice {
    pub offset: usize,
    pub length: usize,
}

impl DataSlice {
    /// Zero-length slice: the scan returns addresses only.
    pub const ADDRESSES_ONLY: DataSlice = DataSlice { offset: 0, length: 0 };

    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        let start = self.offset.min(data.len());
        let end = start.saturating_add(self.length).min(data.len());
        data[start..end].to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAccount {
    pub address: Pubkey,
    pub data: Vec<u8>,
}

pub trait AccountSource {
    /// Accounts owned by `program_id` that match every filter.
    fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        slice: Option<DataSlice>,
    ) -> ClientResult<Vec<KeyedAccount>>;

    /// Full data for each address, `None` where no account exists.
    fn fetch_many(&self, addresses: &[Pubkey]) -> ClientResult<Vec<Option<Vec<u8>>>>;
}

impl<S: AccountSource + ?Sized> AccountSource for &S {
    fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        slice: Option<DataSlice>,
    ) -> ClientResult<Vec<KeyedAccount>> {
        (**self).scan(program_id, filters, slice)
    }

    fn fetch_many(&self, addresses: &[Pubkey]) -> ClientResult<Vec<Option<Vec<u8>>>> {
        (**self).fetch_many(addresses)
    }
}
