use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::metadata::{
    approve_collection_authority, update_metadata_accounts_v2, ApproveCollectionAuthority, Metadata,
    UpdateMetadataAccountsV2,
};
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::errors::RegistryError;
use crate::metadata::{edition_data, EditionMint};
use crate::pda::{COLLECTION_AUTHORITY_SEED, EDITION_SEED, METADATA_SEED};
use crate::state::{CollectionArgs, CollectionRecord, UserRecord};

#[derive(Accounts)]
pub struct MintCollection<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [UserRecord::SEED_PREFIX, owner.key().as_ref()],
        bump = user.bump,
        constraint = user.owner == owner.key() @ RegistryError::Unauthorized
    )]
    pub user: Box<Account<'info, UserRecord>>,

    #[account(
        init,
        payer = owner,
        mint::decimals = 0,
        mint::authority = owner,
        mint::freeze_authority = owner
    )]
    pub collection_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = owner,
        associated_token::mint = collection_mint,
        associated_token::authority = owner
    )]
    pub token_account: Box<Account<'info, TokenAccount>>,

    /// CHECK: address checked by seeds, created by token metadata
    #[account(
        mut,
        seeds = [METADATA_SEED, token_metadata_program.key().as_ref(), collection_mint.key().as_ref()],
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
            collection_mint.key().as_ref(),
            EDITION_SEED
        ],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub master_edition: UncheckedAccount<'info>,

    #[account(
        init,
        payer = owner,
        space = 8 + CollectionRecord::INIT_SPACE,
        seeds = [
            CollectionRecord::SEED_PREFIX,
            owner.key().as_ref(),
            collection_mint.key().as_ref()
        ],
        bump
    )]
    pub collection: Box<Account<'info, CollectionRecord>>,

    /// CHECK: address checked by seeds, created by token metadata
    #[account(
        mut,
        seeds = [
            METADATA_SEED,
            token_metadata_program.key().as_ref(),
            collection_mint.key().as_ref(),
            COLLECTION_AUTHORITY_SEED,
            collection.key().as_ref()
        ],
        bump,
        seeds::program = token_metadata_program.key()
    )]
    pub collection_authority_record: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub token_metadata_program: Program<'info, Metadata>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

impl<'info> MintCollection<'info> {
    fn edition_mint(&self) -> EditionMint<'info> {
        EditionMint {
            owner: self.owner.to_account_info(),
            mint: self.collection_mint.to_account_info(),
            token_account: self.token_account.to_account_info(),
            metadata: self.metadata.to_account_info(),
            master_edition: self.master_edition.to_account_info(),
            token_program: self.token_program.to_account_info(),
            token_metadata_program: self.token_metadata_program.to_account_info(),
            system_program: self.system_program.to_account_info(),
            rent: self.rent.to_account_info(),
        }
    }

    /// Hands update authority to the CollectionRecord PDA, marks the primary
    /// sale done and freezes the collection metadata.
    fn finalize_collection(&self) -> Result<()> {
        update_metadata_accounts_v2(
            CpiContext::new(
                self.token_metadata_program.to_account_info(),
                UpdateMetadataAccountsV2 {
                    metadata: self.metadata.to_account_info(),
                    update_authority: self.owner.to_account_info(),
                },
            ),
            Some(self.collection.key()),
            None,
            Some(true),
            Some(false),
        )
    }

    /// Approves the CollectionRecord PDA as collection authority so the
    /// program can later verify NFTs into this collection on its own.
    ///
    /// Runs after finalize: the PDA signs as update authority, so the
    /// record's stored update authority matches the collection metadata.
    fn link_collection_authority(&self) -> Result<()> {
        let collection = &self.collection;
        let bump = [collection.bump];
        let [prefix, owner, mint] = collection.signer_seeds();
        let seeds: &[&[u8]] = &[prefix, owner, mint, &bump];

        approve_collection_authority(
            CpiContext::new_with_signer(
                self.token_metadata_program.to_account_info(),
                ApproveCollectionAuthority {
                    collection_authority_record: self.collection_authority_record.to_account_info(),
                    new_collection_authority: collection.to_account_info(),
                    update_authority: collection.to_account_info(),
                    payer: self.owner.to_account_info(),
                    metadata: self.metadata.to_account_info(),
                    mint: self.collection_mint.to_account_info(),
                },
                &[seeds],
            )
            .with_remaining_accounts(vec![
                self.system_program.to_account_info(),
                self.rent.to_account_info(),
            ]),
        )
    }
}

pub fn handler(ctx: Context<MintCollection>, args: CollectionArgs) -> Result<()> {
    args.validate()?;

    let owner = ctx.accounts.owner.key();
    let mint = ctx.accounts.collection_mint.key();

    ctx.accounts.edition_mint().mint_with_edition(edition_data(
        &args.name,
        &args.symbol,
        &args.metadata_uri,
        owner,
        None,
    ))?;

    let clock = Clock::get()?;
    let user = &mut ctx.accounts.user;
    let collection_id = user.collections_count;
    user.collections_count = collection_id
        .checked_add(1)
        .ok_or(RegistryError::CounterOverflow)?;

    let name = args.name.clone();
    ctx.accounts.collection.set_inner(CollectionRecord::new(
        owner,
        mint,
        collection_id,
        clock.unix_timestamp,
        ctx.bumps.collection,
        args,
    ));

    ctx.accounts.finalize_collection()?;
    ctx.accounts.link_collection_authority()?;

    msg!(
        "Collection minted: id={}, name={}, mint={}, record={}",
        collection_id,
        name,
        mint,
        ctx.accounts.collection.key()
    );

    Ok(())
}
