//! Filter sets for the registry's query patterns.
//!
//! Every filter starts with the record's discriminator at offset 0; key
//! filters use the offsets published by the record types.

use anchor_lang::prelude::Pubkey;
use anchor_lang::Discriminator;
use nft_registry::state::{CollectionRecord, NftRecord, UserRecord};

use crate::source::AccountFilter;

pub fn discriminator<T: Discriminator>() -> AccountFilter {
    AccountFilter::memcmp(0, T::DISCRIMINATOR)
}

pub fn key_at(offset: usize, key: &Pubkey) -> AccountFilter {
    AccountFilter::memcmp(offset, key.to_bytes())
}

pub fn all_users() -> Vec<AccountFilter> {
    vec![discriminator::<UserRecord>()]
}

pub fn all_collections() -> Vec<AccountFilter> {
    vec![discriminator::<CollectionRecord>()]
}

pub fn collections_by_owner(owner: &Pubkey) -> Vec<AccountFilter> {
    vec![
        discriminator::<CollectionRecord>(),
        key_at(CollectionRecord::OWNER_OFFSET, owner),
    ]
}

pub fn all_nfts() -> Vec<AccountFilter> {
    vec![discriminator::<NftRecord>()]
}

/// NFTs under the collection minted as `collection_mint` (offset 40).
pub fn nfts_by_collection(collection_mint: &Pubkey) -> Vec<AccountFilter> {
    vec![
        discriminator::<NftRecord>(),
        key_at(NftRecord::COLLECTION_MINT_OFFSET, collection_mint),
    ]
}

/// Same set as [`nfts_by_collection`], keyed by the CollectionRecord address.
pub fn nfts_by_collection_record(collection: &Pubkey) -> Vec<AccountFilter> {
    vec![
        discriminator::<NftRecord>(),
        key_at(NftRecord::COLLECTION_OFFSET, collection),
    ]
}

pub fn nfts_by_owner(owner: &Pubkey) -> Vec<AccountFilter> {
    vec![
        discriminator::<NftRecord>(),
        key_at(NftRecord::OWNER_OFFSET, owner),
    ]
}
