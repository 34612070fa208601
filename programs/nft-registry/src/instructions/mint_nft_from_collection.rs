use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::metadata::mpl_token_metadata::accounts::{
    CollectionAuthorityRecord, Metadata as MetadataData,
};
use anchor_spl::metadata::{verify_collection, Metadata, VerifyCollection};
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::errors::RegistryError;
use crate::metadata::{edition_data, EditionMint};
use crate::pda::{self, EDITION_SEED, METADATA_SEED, TOKEN_METADATA_PROGRAM_ID};
use crate::state::{CollectionRecord, NftArgs, NftRecord};

#[derive(Accounts)]
pub struct MintNftFromCollection<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Target collection; item_count is bumped for the new NFT
    #[account(
        mut,
        seeds = [
            CollectionRecord::SEED_PREFIX,
            collection.owner.as_ref(),
            collection.mint.as_ref()
        ],
        bump = collection.bump
    )]
    pub collection: Box<Account<'info, CollectionRecord>>,

    #[account(address = collection.mint)]
    pub collection_mint: Box<Account<'info, Mint>>,

    /// CHECK: address checked by seeds, owned by token metadata
    #[account(
        mut,
        seeds = [METADATA_SEED, token_metadata_program.key().as_ref(), collection_mint.key().as_ref()],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub collection_metadata: UncheckedAccount<'info>,

    /// CHECK: address checked by seeds, owned by token metadata
    #[account(
        seeds = [
            METADATA_SEED,
            token_metadata_program.key().as_ref(),
            collection_mint.key().as_ref(),
            EDITION_SEED
        ],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub collection_master_edition: UncheckedAccount<'info>,

    /// CHECK: validated in the handler so a missing linkage reports
    /// NotCollectionAuthority
    pub collection_authority_record: UncheckedAccount<'info>,

    #[account(
        init,
        payer = owner,
        mint::decimals = 0,
        mint::authority = owner,
        mint::freeze_authority = owner
    )]
    pub nft_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = owner,
        associated_token::mint = nft_mint,
        associated_token::authority = owner
    )]
    pub token_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: address checked by seeds, created by token metadata
    #[account(
        mut,
        seeds = [METADATA_SEED, token_metadata_program.key().as_ref(), nft_mint.key().as_ref()],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub metadata: UncheckedAccount<'info>,

    /// CHECK: address checked by seeds, created by token metadata
    #[account(
        mut,
        seeds = [
            METADATA_SEED,
            token_metadata_program.key().as_ref(),
            nft_mint.key().as_ref(),
            EDITION_SEED
        ],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub master_edition: UncheckedAccount<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + NftRecord::INIT_SPACE,
        seeds = [NftRecord::SEED_PREFIX, collection.key().as_ref(), nft_mint.key().as_ref()],
        bump
    )]
    pub nft: Box<Account<'info, NftRecord>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_metadata_program: Program<'info, Metadata>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

impl<'info> MintNftFromCollection<'info> {
    fn edition_mint(&self) -> EditionMint<'info> {
        EditionMint {
            owner: self.owner.to_account_info(),
            mint: self.nft_mint.to_account_info(),
            token_account: self.token_account.to_account_info(),
            metadata: self.metadata.to_account_info(),
            master_edition: self.master_edition.to_account_info(),
            token_program: self.token_program.to_account_info(),
            token_metadata_program: self.token_metadata_program.to_account_info(),
            system_program: self.system_program.to_account_info(),
            rent: self.rent.to_account_info(),
        }
    }

    /// The authority record must sit at the address derived for this
    /// collection and have been created by token metadata.
    fn require_collection_authority(&self) -> Result<()> {
        let record = &self.collection_authority_record;
        let (expected, _) =
            pda::collection_authority_record(&self.collection.mint, &self.collection.key())?;

        require_keys_eq!(record.key(), expected, RegistryError::NotCollectionAuthority);
        require_keys_eq!(
            *record.owner,
            TOKEN_METADATA_PROGRAM_ID,
            RegistryError::NotCollectionAuthority
        );
        require!(!record.data_is_empty(), RegistryError::NotCollectionAuthority);
        Ok(())
    }

    /// Checks what token metadata enforces on verification, so a mismatch
    /// reports CollectionVerificationFailed instead of aborting inside the CPI.
    ///
    /// The new NFT's metadata must name the collection mint, and the
    /// authority record must have been approved by the collection's current
    /// update authority.
    fn require_verifiable(&self) -> Result<()> {
        let nft_metadata = read_account(&self.metadata, MetadataData::from_bytes)?;
        let named = nft_metadata
            .collection
            .as_ref()
            .is_some_and(|collection| collection.key == self.collection.mint);
        require!(named, RegistryError::CollectionVerificationFailed);

        let collection_metadata = read_account(&self.collection_metadata, MetadataData::from_bytes)?;
        require_keys_eq!(
            collection_metadata.mint,
            self.collection.mint,
            RegistryError::CollectionVerificationFailed
        );

        let record = read_account(
            &self.collection_authority_record,
            CollectionAuthorityRecord::from_bytes,
        )?;
        require!(
            record.update_authority == Some(collection_metadata.update_authority),
            RegistryError::CollectionVerificationFailed
        );
        Ok(())
    }

    /// Marks the new NFT as a verified member, signed by the CollectionRecord PDA.
    ///
    /// Any failure inside token metadata aborts the transaction with its own
    /// error code.
    fn verify_membership(&self) -> Result<()> {
        let collection = &self.collection;
        let bump = [collection.bump];
        let [prefix, owner, mint] = collection.signer_seeds();
        let seeds: &[&[u8]] = &[prefix, owner, mint, &bump];

        verify_collection(
            CpiContext::new_with_signer(
                self.token_metadata_program.to_account_info(),
                VerifyCollection {
                    payer: self.owner.to_account_info(),
                    metadata: self.metadata.to_account_info(),
                    collection_authority: collection.to_account_info(),
                    collection_mint: self.collection_mint.to_account_info(),
                    collection_metadata: self.collection_metadata.to_account_info(),
                    collection_master_edition: self.collection_master_edition.to_account_info(),
                },
                &[seeds],
            )
            .with_remaining_accounts(vec![self.collection_authority_record.to_account_info()]),
            Some(self.collection_authority_record.key()),
        )
    }
}

/// Borsh-decodes a token-metadata account; unreadable data fails verification.
fn read_account<T>(
    info: &AccountInfo,
    decode: impl FnOnce(&[u8]) -> std::io::Result<T>,
) -> Result<T> {
    let data = info.try_borrow_data()?;
    decode(&data[..]).map_err(|err| {
        msg!("cannot decode {}: {}", info.key(), err);
        error!(RegistryError::CollectionVerificationFailed)
    })
}

pub fn handler(ctx: Context<MintNftFromCollection>, args: NftArgs) -> Result<()> {
    args.validate()?;

    let owner = ctx.accounts.owner.key();
    let collection_key = ctx.accounts.collection.key();
    let collection_mint = ctx.accounts.collection.mint;
    let nft_mint = ctx.accounts.nft_mint.key();

    ctx.accounts.edition_mint().mint_with_edition(edition_data(
        &args.name,
        &ctx.accounts.collection.symbol,
        &args.metadata_uri,
        owner,
        Some(collection_mint),
    ))?;

    ctx.accounts.require_collection_authority()?;
    ctx.accounts.require_verifiable()?;
    ctx.accounts.verify_membership()?;

    let clock = Clock::get()?;
    let item_index = ctx.accounts.collection.next_item()?;

    let name = args.name.clone();
    ctx.accounts.nft.set_inner(NftRecord::new(
        owner,
        collection_key,
        nft_mint,
        collection_mint,
        item_index,
        clock.unix_timestamp,
        ctx.bumps.nft,
        args,
    ));

    msg!(
        "NFT minted: collection={}, index={}, name={}, mint={}",
        collection_key,
        item_index,
        name,
        nft_mint
    );

    Ok(())
}
