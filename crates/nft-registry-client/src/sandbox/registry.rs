//! Runs the registry instructions against a [`MemoryLedger`].
//!
//! Each operation opens one unit of work and follows the on-chain handler
//! step for step: same derivations, same record layouts, same error codes.
//! Token and metadata calls go through the injected [`TokenMetadata`].

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::Pubkey;
use anchor_lang::{error, AccountDeserialize, AccountSerialize};
use nft_registry::errors::RegistryError;
use nft_registry::metadata::edition_data;
use nft_registry::state::{CollectionArgs, CollectionRecord, NftArgs, NftRecord, UserRecord};
use tracing::{info, warn};

use super::ledger::{MemoryLedger, UnitOfWork};
use super::subsystem::{load_authority_record, load_metadata, SimulatedTokenMetadata, TokenMetadata};
use crate::error::{ClientError, ClientResult};
use crate::pda::{self, CollectionAddresses, NftAddresses, TOKEN_METADATA_PROGRAM_ID};

fn store<T: AccountSerialize>(record: &T) -> ClientResult<Vec<u8>> {
    let mut data = Vec::new();
    record.try_serialize(&mut data)?;
    Ok(data)
}

fn load<T: AccountDeserialize>(tx: &UnitOfWork<'_>, address: &Pubkey) -> ClientResult<T> {
    let account = tx
        .get(address)
        .ok_or_else(|| ClientError::from(error!(ErrorCode::AccountNotInitialized)))?;
    if account.owner != nft_registry::ID {
        return Err(error!(ErrorCode::AccountOwnedByWrongProgram).into());
    }
    Ok(T::try_deserialize(&mut account.data.as_slice())?)
}

/// Preconditions the metadata program enforces on verification: the NFT
/// names the collection mint and the authority record was approved by the
/// collection's current update authority.
fn require_verifiable(
    tx: &UnitOfWork<'_>,
    nft_mint: &Pubkey,
    collection_mint: &Pubkey,
    authority_record: &Pubkey,
) -> ClientResult<()> {
    let rejected = || ClientError::from(RegistryError::CollectionVerificationFailed);

    let nft = load_metadata(tx, nft_mint).map_err(|_| rejected())?;
    if nft.collection != Some(*collection_mint) {
        return Err(rejected());
    }
    let collection = load_metadata(tx, collection_mint).map_err(|_| rejected())?;
    let record = load_authority_record(tx, authority_record).map_err(|_| rejected())?;
    if record.update_authority != collection.update_authority {
        warn!(%authority_record, "authority record predates the current update authority");
        return Err(rejected());
    }
    Ok(())
}

pub struct SandboxRegistry<M = SimulatedTokenMetadata> {
    ledger: MemoryLedger,
    subsystem: M,
}

impl Default for SandboxRegistry<SimulatedTokenMetadata> {
    fn default() -> Self {
        Self::new(SimulatedTokenMetadata::new())
    }
}

impl<M: TokenMetadata> SandboxRegistry<M> {
    pub fn new(subsystem: M) -> Self {
        Self {
            ledger: MemoryLedger::new(),
            subsystem,
        }
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut MemoryLedger {
        &mut self.ledger
    }

    pub fn subsystem(&self) -> &M {
        &self.subsystem
    }

    pub fn subsystem_mut(&mut self) -> &mut M {
        &mut self.subsystem
    }

    /// Runs `op` in a fresh unit of work, committing only on success.
    fn atomically<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&M, &mut UnitOfWork<'_>) -> ClientResult<T>,
    ) -> ClientResult<T> {
        let subsystem = &self.subsystem;
        let mut tx = self.ledger.begin();
        match op(subsystem, &mut tx) {
            Ok(value) => {
                tx.commit();
                Ok(value)
            }
            Err(err) => {
                warn!(instruction = name, error = %err, "instruction failed, rolled back");
                tx.discard();
                Err(err)
            }
        }
    }

    pub fn register_user(&mut self, owner: &Pubkey) -> ClientResult<Pubkey> {
        self.atomically("register_user", |_, tx| {
            let (address, bump) = pda::user_record(owner)?;
            let record = UserRecord {
                owner: *owner,
                collections_count: 0,
                created_at: tx.unix_timestamp(),
                bump,
            };
            tx.create(address, nft_registry::ID, store(&record)?)?;

            info!(%owner, record = %address, "user registered");
            Ok(address)
        })
    }

    pub fn mint_collection(
        &mut self,
        owner: &Pubkey,
        collection_mint: &Pubkey,
        args: CollectionArgs,
    ) -> ClientResult<CollectionAddresses> {
        self.atomically("mint_collection", |subsystem, tx| {
            args.validate()?;

            let (user_address, _) = pda::user_record(owner)?;
            let mut user: UserRecord = load(tx, &user_address)?;
            if user.owner != *owner {
                return Err(RegistryError::Unauthorized.into());
            }

            subsystem.create_mint(tx, collection_mint, owner)?;
            let token_account = subsystem.create_holding_account(tx, owner, collection_mint)?;
            let data = edition_data(&args.name, &args.symbol, &args.metadata_uri, *owner, None);
            let metadata = subsystem.create_metadata(tx, collection_mint, owner, &data)?;
            let master_edition = subsystem.create_master_edition(tx, collection_mint)?;

            let collection_id = user.collections_count;
            user.collections_count = collection_id
                .checked_add(1)
                .ok_or(RegistryError::CounterOverflow)?;
            tx.write(user_address, store(&user)?)?;

            let (record, bump) = pda::collection_record(owner, collection_mint)?;
            let name = args.name.clone();
            let collection = CollectionRecord::new(
                *owner,
                *collection_mint,
                collection_id,
                tx.unix_timestamp(),
                bump,
                args,
            );
            tx.create(record, nft_registry::ID, store(&collection)?)?;

            subsystem.finalize_collection(tx, collection_mint, owner, &record)?;
            let authority_record =
                subsystem.approve_collection_authority(tx, collection_mint, &record, &record)?;

            info!(%owner, %record, collection_id, name = %name, "collection minted");
            Ok(CollectionAddresses {
                record,
                mint: *collection_mint,
                token_account,
                metadata,
                master_edition,
                authority_record,
            })
        })
    }

    pub fn mint_nft_from_collection(
        &mut self,
        owner: &Pubkey,
        collection: &Pubkey,
        nft_mint: &Pubkey,
        args: NftArgs,
    ) -> ClientResult<NftAddresses> {
        self.atomically("mint_nft_from_collection", |subsystem, tx| {
            args.validate()?;

            let mut record: CollectionRecord = load(tx, collection)?;

            subsystem.create_mint(tx, nft_mint, owner)?;
            let token_account = subsystem.create_holding_account(tx, owner, nft_mint)?;
            let data = edition_data(
                &args.name,
                &record.symbol,
                &args.metadata_uri,
                *owner,
                Some(record.mint),
            );
            let metadata = subsystem.create_metadata(tx, nft_mint, owner, &data)?;
            let master_edition = subsystem.create_master_edition(tx, nft_mint)?;

            let (authority_record, _) = pda::collection_authority_record(&record.mint, collection)?;
            let linked = tx
                .get(&authority_record)
                .is_some_and(|account| account.owner == TOKEN_METADATA_PROGRAM_ID);
            if !linked {
                return Err(RegistryError::NotCollectionAuthority.into());
            }

            require_verifiable(tx, nft_mint, &record.mint, &authority_record)?;
            subsystem.verify_collection_member(tx, nft_mint, &record.mint, collection)?;

            let item_index = record.next_item()?;
            tx.write(*collection, store(&record)?)?;

            let (address, bump) = pda::nft_record(collection, nft_mint)?;
            let name = args.name.clone();
            let nft = NftRecord::new(
                *owner,
                *collection,
                *nft_mint,
                record.mint,
                item_index,
                tx.unix_timestamp(),
                bump,
                args,
            );
            tx.create(address, nft_registry::ID, store(&nft)?)?;

            info!(%collection, item_index, name = %name, nft = %address, "nft minted");
            Ok(NftAddresses {
                record: address,
                mint: *nft_mint,
                token_account,
                metadata,
                master_edition,
            })
        })
    }
}
