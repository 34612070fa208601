use anchor_lang::prelude::*;

use super::{validate_name, validate_uri};

/// An NFT minted from a registry collection.
///
/// `collection_mint` sits at offset 40 for the "NFTs under collection" filter.
/// `collection` is the CollectionRecord back-reference; it maps 1:1 to the
/// collection mint and never changes after creation.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct NftRecord {
    /// Wallet holding the minted unit
    pub owner: Pubkey,

    /// Collection token mint (as written into the NFT's metadata)
    pub collection_mint: Pubkey,

    /// CollectionRecord this NFT belongs to
    pub collection: Pubkey,

    /// NFT token mint
    pub mint: Pubkey,

    /// Position within the collection, starting at 0
    pub item_index: u64,

    /// Unix timestamp when the NFT was minted
    pub created_at: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    #[max_len(32)]
    pub name: String,

    #[max_len(200)]
    pub image_uri: String,

    #[max_len(200)]
    pub metadata_uri: String,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct NftArgs {
    pub name: String,
    pub image_uri: String,
    pub metadata_uri: String,
}

impl NftArgs {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_uri(&self.image_uri)?;
        validate_uri(&self.metadata_uri)?;
        Ok(())
    }
}

impl NftRecord {
    pub const SEED_PREFIX: &'static [u8] = crate::pda::NFT_SEED;

    pub const OWNER_OFFSET: usize = 8;
    pub const COLLECTION_MINT_OFFSET: usize = 40;
    pub const COLLECTION_OFFSET: usize = 72;
    pub const MINT_OFFSET: usize = 104;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: Pubkey,
        collection: Pubkey,
        mint: Pubkey,
        collection_mint: Pubkey,
        item_index: u64,
        created_at: i64,
        bump: u8,
        args: NftArgs,
    ) -> Self {
        Self {
            owner,
            collection,
            mint,
            collection_mint,
            item_index,
            created_at,
            bump,
            name: args.name,
            image_uri: args.image_uri,
            metadata_uri: args.metadata_uri,
        }
    }
}
