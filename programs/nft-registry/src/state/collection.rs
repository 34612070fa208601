use anchor_lang::prelude::*;

use super::{validate_name, validate_symbol, validate_uri};
use crate::errors::RegistryError;

/// A collection minted through the registry.
///
/// Fixed-width fields come first so the owner and mint sit at constant
/// offsets for `getProgramAccounts` filters. Never reorder them.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct CollectionRecord {
    /// Wallet that minted the collection
    pub owner: Pubkey,

    /// Collection token mint
    pub mint: Pubkey,

    /// Owner's collection counter at mint time
    pub collection_id: u64,

    /// Number of NFTs minted into this collection
    pub item_count: u64,

    /// Unix timestamp when the collection was minted
    pub created_at: i64,

    /// Bump seed for PDA derivation (also signs membership verification)
    pub bump: u8,

    #[max_len(32)]
    pub name: String,

    #[max_len(10)]
    pub symbol: String,

    #[max_len(200)]
    pub image_uri: String,

    #[max_len(200)]
    pub metadata_uri: String,
}

/// Instruction arguments shared by the on-chain handler and off-chain callers.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CollectionArgs {
    pub name: String,
    pub symbol: String,
    pub image_uri: String,
    pub metadata_uri: String,
}

impl CollectionArgs {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_symbol(&self.symbol)?;
        validate_uri(&self.image_uri)?;
        validate_uri(&self.metadata_uri)?;
        Ok(())
    }
}

impl CollectionRecord {
    pub const SEED_PREFIX: &'static [u8] = crate::pda::COLLECTION_SEED;

    pub const OWNER_OFFSET: usize = 8;
    pub const MINT_OFFSET: usize = 40;
    pub const ITEM_COUNT_OFFSET: usize = 80;

    pub fn new(
        owner: Pubkey,
        mint: Pubkey,
        collection_id: u64,
        created_at: i64,
        bump: u8,
        args: CollectionArgs,
    ) -> Self {
        Self {
            owner,
            mint,
            collection_id,
            item_count: 0,
            created_at,
            bump,
            name: args.name,
            symbol: args.symbol,
            image_uri: args.image_uri,
            metadata_uri: args.metadata_uri,
        }
    }

    /// Reserves the next item index.
    pub fn next_item(&mut self) -> Result<u64> {
        let index = self.item_count;
        self.item_count = index.checked_add(1).ok_or(RegistryError::CollectionFull)?;
        Ok(index)
    }

    pub fn signer_seeds(&self) -> [&[u8]; 3] {
        [Self::SEED_PREFIX, self.owner.as_ref(), self.mint.as_ref()]
    }
}
