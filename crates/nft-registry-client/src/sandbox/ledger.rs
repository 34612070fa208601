//! In-memory account store with all-or-nothing units of work.

use std::collections::BTreeMap;

use anchor_lang::prelude::Pubkey;
use nft_registry::errors::RegistryError;
use tracing::{debug, trace};

use crate::error::{ClientError, ClientResult};
use crate::source::{AccountFilter, AccountSource, DataSlice, KeyedAccount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: BTreeMap<Pubkey, StoredAccount>,
    unix_timestamp: i64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Pubkey) -> Option<&StoredAccount> {
        self.accounts.get(address)
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn addresses(&self) -> Vec<Pubkey> {
        self.accounts.keys().copied().collect()
    }

    /// Writes an account directly, outside any unit of work. For seeding
    /// fixtures such as accounts created by other programs.
    pub fn insert(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.insert(address, StoredAccount { owner, data });
    }

    /// Drops an account directly, as a closing instruction would.
    pub fn remove(&mut self, address: &Pubkey) -> Option<StoredAccount> {
        self.accounts.remove(address)
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.unix_timestamp
    }

    pub fn set_unix_timestamp(&mut self, unix_timestamp: i64) {
        self.unix_timestamp = unix_timestamp;
    }

    pub fn begin(&mut self) -> UnitOfWork<'_> {
        UnitOfWork {
            ledger: self,
            staged: BTreeMap::new(),
        }
    }
}

impl AccountSource for MemoryLedger {
    fn scan(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
        slice: Option<DataSlice>,
    ) -> ClientResult<Vec<KeyedAccount>> {
        Ok(self
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|filter| filter.matches(&account.data)))
            .map(|(address, account)| KeyedAccount {
                address: *address,
                data: match slice {
                    Some(slice) => slice.apply(&account.data),
                    None => account.data.clone(),
                },
            })
            .collect())
    }

    fn fetch_many(&self, addresses: &[Pubkey]) -> ClientResult<Vec<Option<Vec<u8>>>> {
        Ok(addresses
            .iter()
            .map(|address| self.accounts.get(address).map(|account| account.data.clone()))
            .collect())
    }
}

/// Staged writes against a [`MemoryLedger`].
///
/// Reads see staged writes first. Nothing reaches the ledger until
/// [`UnitOfWork::commit`]; dropping or discarding throws every write away.
pub struct UnitOfWork<'a> {
    ledger: &'a mut MemoryLedger,
    staged: BTreeMap<Pubkey, StoredAccount>,
}

impl<'a> UnitOfWork<'a> {
    pub fn get(&self, address: &Pubkey) -> Option<&StoredAccount> {
        self.staged.get(address).or_else(|| self.ledger.get(address))
    }

    pub fn is_occupied(&self, address: &Pubkey) -> bool {
        self.get(address).is_some()
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.ledger.unix_timestamp
    }

    /// Allocates a new account; fails if the address is already in use.
    pub fn create(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) -> ClientResult<()> {
        if self.is_occupied(&address) {
            return Err(RegistryError::AlreadyExists.into());
        }
        trace!(%address, %owner, len = data.len(), "stage create");
        self.staged.insert(address, StoredAccount { owner, data });
        Ok(())
    }

    /// Replaces the data of an existing account, keeping its owner.
    pub fn write(&mut self, address: Pubkey, data: Vec<u8>) -> ClientResult<()> {
        let owner = self
            .get(&address)
            .map(|account| account.owner)
            .ok_or(ClientError::AccountNotFound(address))?;
        trace!(%address, len = data.len(), "stage write");
        self.staged.insert(address, StoredAccount { owner, data });
        Ok(())
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Applies every staged write. Returns how many accounts changed.
    pub fn commit(self) -> usize {
        let count = self.staged.len();
        self.ledger.accounts.extend(self.staged);
        debug!(accounts = count, "unit of work committed");
        count
    }

    pub fn discard(self) {
        debug!(accounts = self.staged.len(), "unit of work discarded");
    }
}
