use anchor_lang::prelude::*;

pub mod errors;
pub mod instructions;
pub mod metadata;
pub mod pda;
pub mod state;

use instructions::*;
use state::{CollectionArgs, NftArgs};

declare_id!("GjsR1GVT5G51oMuTDrRzPporaknzWM39TgJs9n84Wmti");

#[program]
pub mod nft_registry {
    use super::*;

    /// Create the caller's user record (one per wallet)
    pub fn register_user(ctx: Context<RegisterUser>) -> Result<()> {
        instructions::register_user::handler(ctx)
    }

    /// Mint a collection NFT, record it, and delegate collection authority
    /// to the collection record so the program can verify members later
    pub fn mint_collection(
        ctx: Context<MintCollection>,
        name: String,
        symbol: String,
        image_uri: String,
        metadata_uri: String,
    ) -> Result<()> {
        instructions::mint_collection::handler(
            ctx,
            CollectionArgs {
                name,
                symbol,
                image_uri,
                metadata_uri,
            },
        )
    }

    /// Mint an NFT into an existing collection as a verified member
    pub fn mint_nft_from_collection(
        ctx: Context<MintNftFromCollection>,
        name: String,
        image_uri: String,
        metadata_uri: String,
    ) -> Result<()> {
        instructions::mint_nft_from_collection::handler(
            ctx,
            NftArgs {
                name,
                image_uri,
                metadata_uri,
            },
        )
    }
}
