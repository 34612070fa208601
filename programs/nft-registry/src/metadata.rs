//! Token and token-metadata CPIs shared by both mint instructions.

use anchor_lang::prelude::*;
use anchor_spl::metadata::mpl_token_metadata::types::{Collection, Creator, DataV2};
use anchor_spl::metadata::{
    create_master_edition_v3, create_metadata_accounts_v3, CreateMasterEditionV3,
    CreateMetadataAccountsV3,
};
use anchor_spl::token::{self, MintTo};

/// Accounts needed to turn a freshly initialized mint into a one-of-one
/// master edition held by `owner`.
pub struct EditionMint<'info> {
    pub owner: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
    pub token_account: AccountInfo<'info>,
    pub metadata: AccountInfo<'info>,
    pub master_edition: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
    pub token_metadata_program: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
    pub rent: AccountInfo<'info>,
}

impl<'info> EditionMint<'info> {
    /// Mints the single unit into the owner's associated account.
    pub fn mint_one(&self) -> Result<()> {
        token::mint_to(
            CpiContext::new(
                self.token_program.clone(),
                MintTo {
                    mint: self.mint.clone(),
                    to: self.token_account.clone(),
                    authority: self.owner.clone(),
                },
            ),
            1,
        )
    }

    pub fn create_metadata(&self, data: DataV2) -> Result<()> {
        create_metadata_accounts_v3(
            CpiContext::new(
                self.token_metadata_program.clone(),
                CreateMetadataAccountsV3 {
                    metadata: self.metadata.clone(),
                    mint: self.mint.clone(),
                    mint_authority: self.owner.clone(),
                    payer: self.owner.clone(),
                    update_authority: self.owner.clone(),
                    system_program: self.system_program.clone(),
                    rent: self.rent.clone(),
                },
            ),
            data,
            true,
            true,
            None,
        )
    }

    /// Max supply 0: no prints can ever be made from this edition.
    pub fn create_master_edition(&self) -> Result<()> {
        create_master_edition_v3(
            CpiContext::new(
                self.token_metadata_program.clone(),
                CreateMasterEditionV3 {
                    edition: self.master_edition.clone(),
                    mint: self.mint.clone(),
                    update_authority: self.owner.clone(),
                    mint_authority: self.owner.clone(),
                    payer: self.owner.clone(),
                    metadata: self.metadata.clone(),
                    token_program: self.token_program.clone(),
                    system_program: self.system_program.clone(),
                    rent: self.rent.clone(),
                },
            ),
            Some(0),
        )
    }

    pub fn mint_with_edition(&self, data: DataV2) -> Result<()> {
        self.mint_one()?;
        self.create_metadata(data)?;
        self.create_master_edition()
    }
}

/// Metadata payload with the owner as sole, verified creator and no royalty.
pub fn edition_data(
    name: &str,
    symbol: &str,
    uri: &str,
    creator: Pubkey,
    collection_mint: Option<Pubkey>,
) -> DataV2 {
    DataV2 {
        name: name.to_string(),
        symbol: symbol.to_string(),
        uri: uri.to_string(),
        seller_fee_basis_points: 0,
        creators: Some(vec![Creator {
            address: creator,
            verified: true,
            share: 100,
        }]),
        collection: collection_mint.map(|key| Collection {
            verified: false,
            key,
        }),
        uses: None,
    }
}
