//! Token and token-metadata capability consumed by the sandbox registry.
//!
//! Stands in for the SPL token, associated-token and token-metadata
//! programs. Every call writes through the caller's unit of work, so a
//! failed operation discards subsystem accounts along with registry ones.

use std::collections::HashSet;

use anchor_lang::prelude::{borsh, AnchorDeserialize, AnchorSerialize, Pubkey};
use anchor_spl::associated_token::get_associated_token_address;
use anchor_spl::metadata::mpl_token_metadata::types::DataV2;
use tracing::debug;

use super::ledger::UnitOfWork;
use crate::error::{ClientError, ClientResult};
use crate::pda::{self, TOKEN_METADATA_PROGRAM_ID};

/// Individual subsystem calls, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsystemCall {
    CreateMint,
    CreateHoldingAccount,
    CreateMetadata,
    CreateMasterEdition,
    FinalizeCollection,
    ApproveCollectionAuthority,
    VerifyCollectionMember,
}

pub trait TokenMetadata {
    /// Initializes a zero-decimal mint at `mint` with `authority` as mint and
    /// freeze authority.
    fn create_mint(&self, tx: &mut UnitOfWork<'_>, mint: &Pubkey, authority: &Pubkey) -> ClientResult<()>;

    /// Creates `owner`'s associated account for `mint` and mints one unit into it.
    fn create_holding_account(
        &self,
        tx: &mut UnitOfWork<'_>,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> ClientResult<Pubkey>;

    fn create_metadata(
        &self,
        tx: &mut UnitOfWork<'_>,
        mint: &Pubkey,
        update_authority: &Pubkey,
        data: &DataV2,
    ) -> ClientResult<Pubkey>;

    fn create_master_edition(&self, tx: &mut UnitOfWork<'_>, mint: &Pubkey) -> ClientResult<Pubkey>;

    /// Moves update authority to `new_update_authority`, marks the primary
    /// sale done and makes the metadata immutable.
    fn finalize_collection(
        &self,
        tx: &mut UnitOfWork<'_>,
        mint: &Pubkey,
        update_authority: &Pubkey,
        new_update_authority: &Pubkey,
    ) -> ClientResult<()>;

    /// Delegates collection authority over `collection_mint` to `authority`.
    fn approve_collection_authority(
        &self,
        tx: &mut UnitOfWork<'_>,
        collection_mint: &Pubkey,
        update_authority: &Pubkey,
        authority: &Pubkey,
    ) -> ClientResult<Pubkey>;

    /// Flags the NFT's metadata as a verified member of `collection_mint`,
    /// acting as the delegated `authority`.
    fn verify_collection_member(
        &self,
        tx: &mut UnitOfWork<'_>,
        nft_mint: &Pubkey,
        collection_mint: &Pubkey,
        authority: &Pubkey,
    ) -> ClientResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SimMint {
    pub authority: Pubkey,
    pub decimals: u8,
    pub supply: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SimHolding {
    pub owner: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SimMetadata {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub collection: Option<Pubkey>,
    pub collection_verified: bool,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SimMasterEdition {
    pub mint: Pubkey,
    pub max_supply: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct SimAuthorityRecord {
    pub mint: Pubkey,
    pub authority: Pubkey,
    /// Update authority of the collection when the record was approved.
    pub update_authority: Pubkey,
}

fn encode<T: AnchorSerialize>(value: &T) -> ClientResult<Vec<u8>> {
    let mut data = Vec::new();
    value
        .serialize(&mut data)
        .map_err(|err| ClientError::Subsystem(format!("encode: {err}")))?;
    Ok(data)
}

fn load<T: AnchorDeserialize>(tx: &UnitOfWork<'_>, address: &Pubkey) -> ClientResult<T> {
    let account = tx.get(address).ok_or(ClientError::AccountNotFound(*address))?;
    T::try_from_slice(&account.data)
        .map_err(|err| ClientError::Subsystem(format!("decode {address}: {err}")))
}

/// Creates a subsystem-owned account. An occupied address is the system
/// program's "already in use" failure, not a registry error.
fn allocate(tx: &mut UnitOfWork<'_>, address: Pubkey, owner: Pubkey, data: Vec<u8>) -> ClientResult<()> {
    if tx.is_occupied(&address) {
        return Err(ClientError::Subsystem(format!("account {address} already in use")));
    }
    tx.create(address, owner, data)
}

/// Metadata account for `mint`, as the simulated metadata program stores it.
pub fn load_metadata(tx: &UnitOfWork<'_>, mint: &Pubkey) -> ClientResult<SimMetadata> {
    let (address, _) = pda::metadata_account(mint)?;
    load(tx, &address)
}

pub fn load_authority_record(tx: &UnitOfWork<'_>, address: &Pubkey) -> ClientResult<SimAuthorityRecord> {
    load(tx, address)
}

/// In-process token/metadata programs with per-call failure injection.
#[derive(Debug, Default)]
pub struct SimulatedTokenMetadata {
    failing: HashSet<SubsystemCall>,
}

impl SimulatedTokenMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `call` fail until cleared.
    pub fn fail_on(&mut self, call: SubsystemCall) {
        self.failing.insert(call);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    fn check(&self, call: SubsystemCall) -> ClientResult<()> {
        if self.failing.contains(&call) {
            debug!(?call, "injected subsystem failure");
            return Err(ClientError::Subsystem(format!("{call:?} rejected")));
        }
        Ok(())
    }
}

impl TokenMetadata for SimulatedTokenMetadata {
    fn create_mint(&self, tx: &mut UnitOfWork<'_>, mint: &Pubkey, authority: &Pubkey) -> ClientResult<()> {
        self.check(SubsystemCall::CreateMint)?;
        let data = encode(&SimMint {
            authority: *authority,
            decimals: 0,
            supply: 0,
        })?;
        allocate(tx, *mint, anchor_spl::token::ID, data)
    }

    fn create_holding_account(
        &self,
        tx: &mut UnitOfWork<'_>,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> ClientResult<Pubkey> {
        self.check(SubsystemCall::CreateHoldingAccount)?;
        let mut mint_state: SimMint = load(tx, mint)?;
        if mint_state.authority != *owner {
            return Err(ClientError::Subsystem(format!("{owner} is not the mint authority")));
        }
        mint_state.supply += 1;
        tx.write(*mint, encode(&mint_state)?)?;

        let address = get_associated_token_address(owner, mint);
        let holding = SimHolding {
            owner: *owner,
            mint: *mint,
            amount: 1,
        };
        allocate(tx, address, anchor_spl::token::ID, encode(&holding)?)?;
        Ok(address)
    }

    fn create_metadata(
        &self,
        tx: &mut UnitOfWork<'_>,
        mint: &Pubkey,
        update_authority: &Pubkey,
        data: &DataV2,
    ) -> ClientResult<Pubkey> {
        self.check(SubsystemCall::CreateMetadata)?;
        let (address, _) = pda::metadata_account(mint)?;
        let metadata = SimMetadata {
            mint: *mint,
            update_authority: *update_authority,
            name: data.name.clone(),
            symbol: data.symbol.clone(),
            uri: data.uri.clone(),
            collection: data.collection.as_ref().map(|collection| collection.key),
            collection_verified: false,
            primary_sale_happened: false,
            is_mutable: true,
        };
        allocate(tx, address, TOKEN_METADATA_PROGRAM_ID, encode(&metadata)?)?;
        Ok(address)
    }

    fn create_master_edition(&self, tx: &mut UnitOfWork<'_>, mint: &Pubkey) -> ClientResult<Pubkey> {
        self.check(SubsystemCall::CreateMasterEdition)?;
        let (metadata, _) = pda::metadata_account(mint)?;
        if !tx.is_occupied(&metadata) {
            return Err(ClientError::Subsystem(format!("mint {mint} has no metadata")));
        }
        let (address, _) = pda::master_edition_account(mint)?;
        let edition = SimMasterEdition {
            mint: *mint,
            max_supply: Some(0),
        };
        allocate(tx, address, TOKEN_METADATA_PROGRAM_ID, encode(&edition)?)?;
        Ok(address)
    }

    fn finalize_collection(
        &self,
        tx: &mut UnitOfWork<'_>,
        mint: &Pubkey,
        update_authority: &Pubkey,
        new_update_authority: &Pubkey,
    ) -> ClientResult<()> {
        self.check(SubsystemCall::FinalizeCollection)?;
        let (address, _) = pda::metadata_account(mint)?;
        let mut metadata: SimMetadata = load(tx, &address)?;
        if metadata.update_authority != *update_authority {
            return Err(ClientError::Subsystem(format!(
                "{update_authority} is not the update authority of {mint}"
            )));
        }
        if !metadata.is_mutable {
            return Err(ClientError::Subsystem(format!("metadata of {mint} is immutable")));
        }
        metadata.update_authority = *new_update_authority;
        metadata.primary_sale_happened = true;
        metadata.is_mutable = false;
        tx.write(address, encode(&metadata)?)
    }

    fn approve_collection_authority(
        &self,
        tx: &mut UnitOfWork<'_>,
        collection_mint: &Pubkey,
        update_authority: &Pubkey,
        authority: &Pubkey,
    ) -> ClientResult<Pubkey> {
        self.check(SubsystemCall::ApproveCollectionAuthority)?;
        let (metadata_address, _) = pda::metadata_account(collection_mint)?;
        let metadata: SimMetadata = load(tx, &metadata_address)?;
        if metadata.update_authority != *update_authority {
            return Err(ClientError::Subsystem(format!(
                "{update_authority} is not the update authority of {collection_mint}"
            )));
        }

        let (address, _) = pda::collection_authority_record(collection_mint, authority)?;
        let record = SimAuthorityRecord {
            mint: *collection_mint,
            authority: *authority,
            update_authority: *update_authority,
        };
        allocate(tx, address, TOKEN_METADATA_PROGRAM_ID, encode(&record)?)?;
        Ok(address)
    }

    fn verify_collection_member(
        &self,
        tx: &mut UnitOfWork<'_>,
        nft_mint: &Pubkey,
        collection_mint: &Pubkey,
        authority: &Pubkey,
    ) -> ClientResult<()> {
        self.check(SubsystemCall::VerifyCollectionMember)?;
        let (record, _) = pda::collection_authority_record(collection_mint, authority)?;
        let record: SimAuthorityRecord = load(tx, &record)?;
        if record.authority != *authority || record.mint != *collection_mint {
            return Err(ClientError::Subsystem("authority record mismatch".to_string()));
        }
        let collection = load_metadata(tx, collection_mint)?;
        if record.update_authority != collection.update_authority {
            return Err(ClientError::Subsystem(
                "authority record approved by a previous update authority".to_string(),
            ));
        }

        let (metadata_address, _) = pda::metadata_account(nft_mint)?;
        let mut metadata: SimMetadata = load(tx, &metadata_address)?;
        if metadata.collection != Some(*collection_mint) {
            return Err(ClientError::Subsystem(format!(
                "metadata of {nft_mint} does not name collection {collection_mint}"
            )));
        }
        metadata.collection_verified = true;
        tx.write(metadata_address, encode(&metadata)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::MemoryLedger;
    use nft_registry::metadata::edition_data;

    fn minted_with_metadata(
        subsystem: &SimulatedTokenMetadata,
        tx: &mut UnitOfWork<'_>,
        owner: &Pubkey,
        mint: &Pubkey,
        collection: Option<Pubkey>,
    ) {
        subsystem.create_mint(tx, mint, owner).unwrap();
        subsystem.create_holding_account(tx, owner, mint).unwrap();
        let data = edition_data("Item", "ITM", "https://x/i.json", *owner, collection);
        subsystem.create_metadata(tx, mint, owner, &data).unwrap();
    }

    #[test]
    fn holding_account_receives_one_unit() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        subsystem.create_mint(&mut tx, &mint, &owner).unwrap();
        let holding = subsystem.create_holding_account(&mut tx, &owner, &mint).unwrap();

        let mint_state: SimMint = load(&tx, &mint).unwrap();
        let holding_state: SimHolding = load(&tx, &holding).unwrap();
        assert_eq!(mint_state.supply, 1);
        assert_eq!(holding_state.amount, 1);
        assert_eq!(holding, get_associated_token_address(&owner, &mint));
    }

    #[test]
    fn only_mint_authority_can_fund_holding() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        subsystem.create_mint(&mut tx, &mint, &Pubkey::new_unique()).unwrap();
        let err = subsystem
            .create_holding_account(&mut tx, &Pubkey::new_unique(), &mint)
            .unwrap_err();
        assert!(matches!(err, ClientError::Subsystem(_)));
    }

    #[test]
    fn verification_needs_authority_record() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let owner = Pubkey::new_unique();
        let collection_mint = Pubkey::new_unique();
        let nft_mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let mut tx = ledger.begin();
        minted_with_metadata(&subsystem, &mut tx, &owner, &collection_mint, None);
        minted_with_metadata(&subsystem, &mut tx, &owner, &nft_mint, Some(collection_mint));

        assert!(subsystem
            .verify_collection_member(&mut tx, &nft_mint, &collection_mint, &authority)
            .is_err());

        subsystem
            .approve_collection_authority(&mut tx, &collection_mint, &owner, &authority)
            .unwrap();
        subsystem
            .verify_collection_member(&mut tx, &nft_mint, &collection_mint, &authority)
            .unwrap();

        let (address, _) = pda::metadata_account(&nft_mint).unwrap();
        let metadata: SimMetadata = load(&tx, &address).unwrap();
        assert!(metadata.collection_verified);
    }

    #[test]
    fn approval_requires_update_authority() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let owner = Pubkey::new_unique();
        let collection_mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        minted_with_metadata(&subsystem, &mut tx, &owner, &collection_mint, None);
        let err = subsystem
            .approve_collection_authority(
                &mut tx,
                &collection_mint,
                &Pubkey::new_unique(),
                &Pubkey::new_unique(),
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::Subsystem(_)));
    }

    #[test]
    fn injected_failure_stops_the_call() {
        let mut ledger = MemoryLedger::new();
        let mut subsystem = SimulatedTokenMetadata::new();
        subsystem.fail_on(SubsystemCall::CreateMint);

        let mint = Pubkey::new_unique();
        let mut tx = ledger.begin();
        assert!(subsystem.create_mint(&mut tx, &mint, &Pubkey::new_unique()).is_err());
        assert!(!tx.is_occupied(&mint));

        subsystem.clear_failures();
        subsystem.create_mint(&mut tx, &mint, &Pubkey::new_unique()).unwrap();
        assert!(tx.is_occupied(&mint));
    }

    #[test]
    fn finalize_freezes_metadata_and_moves_authority() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let owner = Pubkey::new_unique();
        let record = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        minted_with_metadata(&subsystem, &mut tx, &owner, &mint, None);
        subsystem.finalize_collection(&mut tx, &mint, &owner, &record).unwrap();

        let metadata = load_metadata(&tx, &mint).unwrap();
        assert_eq!(metadata.update_authority, record);
        assert!(metadata.primary_sale_happened);
        assert!(!metadata.is_mutable);

        assert!(subsystem.finalize_collection(&mut tx, &mint, &record, &owner).is_err());
    }

    #[test]
    fn record_from_previous_update_authority_does_not_verify() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let owner = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let collection_mint = Pubkey::new_unique();
        let nft_mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        minted_with_metadata(&subsystem, &mut tx, &owner, &collection_mint, None);
        minted_with_metadata(&subsystem, &mut tx, &owner, &nft_mint, Some(collection_mint));
        subsystem
            .approve_collection_authority(&mut tx, &collection_mint, &owner, &authority)
            .unwrap();
        subsystem
            .finalize_collection(&mut tx, &collection_mint, &owner, &authority)
            .unwrap();

        assert!(subsystem
            .verify_collection_member(&mut tx, &nft_mint, &collection_mint, &authority)
            .is_err());
    }

    #[test]
    fn occupied_subsystem_address_is_not_a_registry_error() {
        let mut ledger = MemoryLedger::new();
        let subsystem = SimulatedTokenMetadata::new();
        let mint = Pubkey::new_unique();

        let mut tx = ledger.begin();
        subsystem.create_mint(&mut tx, &mint, &Pubkey::new_unique()).unwrap();
        let err = subsystem
            .create_mint(&mut tx, &mint, &Pubkey::new_unique())
            .unwrap_err();
        assert!(matches!(err, ClientError::Subsystem(_)));
        assert_eq!(err.error_code(), None);
    }
}
