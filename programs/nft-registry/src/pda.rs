//! Address derivation for every account the registry reads or writes.
//!
//! Seed order is a wire contract: changing any seed list moves every
//! previously derived address. On-chain `seeds = [...]` constraints and the
//! off-chain client both go through the constants below.

use anchor_lang::prelude::*;
use anchor_spl::metadata::mpl_token_metadata;

use crate::errors::RegistryError;

pub const USER_SEED: &[u8] = b"user_account";
pub const COLLECTION_SEED: &[u8] = b"collection";
pub const NFT_SEED: &[u8] = b"nft";

/// Token-metadata namespace seeds.
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED: &[u8] = b"edition";
pub const COLLECTION_AUTHORITY_SEED: &[u8] = b"collection_authority";

pub const TOKEN_METADATA_PROGRAM_ID: Pubkey = mpl_token_metadata::ID;

/// Searches bumps 255..=0 for an off-curve address.
///
/// Fails with `AddressExhausted` if every bump lands on the curve.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| error!(RegistryError::AddressExhausted))
}

pub fn user_record(owner: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[USER_SEED, owner.as_ref()], &crate::ID)
}

pub fn collection_record(owner: &Pubkey, collection_mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(
        &[COLLECTION_SEED, owner.as_ref(), collection_mint.as_ref()],
        &crate::ID,
    )
}

pub fn nft_record(collection_record: &Pubkey, nft_mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(
        &[NFT_SEED, collection_record.as_ref(), nft_mint.as_ref()],
        &crate::ID,
    )
}

/// Token-metadata record that delegates collection authority over
/// `collection_mint` to `authority` (the CollectionRecord PDA).
pub fn collection_authority_record(
    collection_mint: &Pubkey,
    authority: &Pubkey,
) -> Result<(Pubkey, u8)> {
    derive(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            collection_mint.as_ref(),
            COLLECTION_AUTHORITY_SEED,
            authority.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}

pub fn metadata_account(mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(
        &[METADATA_SEED, TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}

pub fn master_edition_account(mint: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            EDITION_SEED,
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}
