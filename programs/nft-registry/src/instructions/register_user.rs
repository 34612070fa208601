use anchor_lang::prelude::*;
use crate::state::UserRecord;
use crate::errors::RegistryError;

#[derive(Accounts)]
pub struct RegisterUser<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// Opened with init_if_needed so a second registration reaches the
    /// handler and fails with AlreadyExists instead of a system error
    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + UserRecord::INIT_SPACE,
        seeds = [UserRecord::SEED_PREFIX, owner.key().as_ref()],
        bump
    )]
    pub user: Account<'info, UserRecord>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RegisterUser>) -> Result<()> {
    let user = &mut ctx.accounts.user;
    require!(!user.is_registered(), RegistryError::AlreadyExists);

    let clock = Clock::get()?;

    user.owner = ctx.accounts.owner.key();
    user.collections_count = 0;
    user.created_at = clock.unix_timestamp;
    user.bump = ctx.bumps.user;

    msg!("User registered: owner={}, record={}", user.owner, user.key());

    Ok(())
}
