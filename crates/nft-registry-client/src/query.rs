//! Filtered, paginated reads over the registry's accounts.
//!
//! Listing is two-phase: [`RegistryQuery::addresses`] scans with a
//! zero-length data slice, then [`RegistryQuery::fetch_records`] pulls full
//! data for a bounded page. [`RegistryQuery::scan_records`] does the same in
//! one round trip and exists for small result sets and cross-checks.

use anchor_lang::prelude::Pubkey;
use anchor_lang::AccountDeserialize;
use nft_registry::state::{CollectionRecord, NftRecord, UserRecord};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::filters;
use crate::source::{AccountFilter, AccountSource, DataSlice};

/// Upper bound on addresses per `getMultipleAccounts` call.
pub const MAX_FETCH_BATCH: usize = 100;

/// A window over a sorted address list.
///
/// The limit is clamped to `1..=MAX_FETCH_BATCH` on construction, so
/// [`Page::next`] always advances by exactly what the previous page returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: usize,
    limit: usize,
}

impl Page {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: limit.clamp(1, MAX_FETCH_BATCH),
        }
    }

    pub fn first(limit: usize) -> Self {
        Self::new(0, limit)
    }

    pub fn next(self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

pub fn decode<T: AccountDeserialize>(address: &Pubkey, data: &[u8]) -> ClientResult<T> {
    let mut bytes = data;
    T::try_deserialize(&mut bytes).map_err(|err| ClientError::Decode {
        address: *address,
        reason: err.to_string(),
    })
}

pub struct RegistryQuery<S> {
    source: S,
    program_id: Pubkey,
}

impl<S: AccountSource> RegistryQuery<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            program_id: nft_registry::ID,
        }
    }

    /// Phase one: matching addresses, sorted bytewise so pages are stable.
    pub fn addresses(&self, filters: &[AccountFilter]) -> ClientResult<Vec<Pubkey>> {
        let mut addresses: Vec<Pubkey> = self
            .source
            .scan(&self.program_id, filters, Some(DataSlice::ADDRESSES_ONLY))?
            .into_iter()
            .map(|account| account.address)
            .collect();
        addresses.sort();
        Ok(addresses)
    }

    /// Phase two: full records for `addresses`, in batches.
    ///
    /// Accounts that disappeared since the scan are skipped.
    pub fn fetch_records<T: AccountDeserialize>(
        &self,
        addresses: &[Pubkey],
    ) -> ClientResult<Vec<(Pubkey, T)>> {
        let mut records = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_FETCH_BATCH) {
            let fetched = self.source.fetch_many(chunk)?;
            for (address, data) in chunk.iter().zip(fetched) {
                match data {
                    Some(data) => records.push((*address, decode::<T>(address, &data)?)),
                    None => warn!(%address, "account vanished between scan and fetch"),
                }
            }
        }
        Ok(records)
    }

    /// Both phases for one page of results.
    pub fn page<T: AccountDeserialize>(
        &self,
        filters: &[AccountFilter],
        page: Page,
    ) -> ClientResult<Vec<(Pubkey, T)>> {
        let addresses = self.addresses(filters)?;
        let window = page.window(&addresses);
        debug!(
            total = addresses.len(),
            offset = page.offset,
            returned = window.len(),
            "query page"
        );
        self.fetch_records(window)
    }

    /// Every matching record, fetched with full data in a single scan.
    pub fn scan_records<T: AccountDeserialize>(
        &self,
        filters: &[AccountFilter],
    ) -> ClientResult<Vec<(Pubkey, T)>> {
        let mut records = self
            .source
            .scan(&self.program_id, filters, None)?
            .into_iter()
            .map(|account| decode::<T>(&account.address, &account.data).map(|r| (account.address, r)))
            .collect::<ClientResult<Vec<_>>>()?;
        records.sort_by_key(|(address, _)| *address);
        Ok(records)
    }

    /// Single record by address.
    pub fn get<T: AccountDeserialize>(&self, address: &Pubkey) -> ClientResult<T> {
        let data = self
            .source
            .fetch_many(std::slice::from_ref(address))?
            .pop()
            .flatten()
            .ok_or(ClientError::AccountNotFound(*address))?;
        decode(address, &data)
    }

    pub fn user(&self, owner: &Pubkey) -> ClientResult<UserRecord> {
        let (address, _) = nft_registry::pda::user_record(owner)?;
        self.get(&address)
    }

    pub fn collection_addresses_by_owner(&self, owner: &Pubkey) -> ClientResult<Vec<Pubkey>> {
        self.addresses(&filters::collections_by_owner(owner))
    }

    pub fn collections_by_owner(
        &self,
        owner: &Pubkey,
        page: Page,
    ) -> ClientResult<Vec<(Pubkey, CollectionRecord)>> {
        self.page(&filters::collections_by_owner(owner), page)
    }

    /// NFT records under the collection minted as `collection_mint`.
    pub fn nft_addresses_in_collection(&self, collection_mint: &Pubkey) -> ClientResult<Vec<Pubkey>> {
        self.addresses(&filters::nfts_by_collection(collection_mint))
    }

    pub fn nfts_in_collection(
        &self,
        collection_mint: &Pubkey,
        page: Page,
    ) -> ClientResult<Vec<(Pubkey, NftRecord)>> {
        self.page(&filters::nfts_by_collection(collection_mint), page)
    }

    pub fn nfts_by_owner(&self, owner: &Pubkey, page: Page) -> ClientResult<Vec<(Pubkey, NftRecord)>> {
        self.page(&filters::nfts_by_owner(owner), page)
    }

    pub fn user_addresses(&self) -> ClientResult<Vec<Pubkey>> {
        self.addresses(&filters::all_users())
    }
}
