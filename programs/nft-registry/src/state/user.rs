use anchor_lang::prelude::*;

/// One per owner wallet; the address is a pure function of the owner key.
#[account]
#[derive(InitSpace, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// Wallet that registered
    pub owner: Pubkey,

    /// Number of collections minted by this owner
    pub collections_count: u64,

    /// Unix timestamp of registration
    pub created_at: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl UserRecord {
    pub const SEED_PREFIX: &'static [u8] = crate::pda::USER_SEED;

    pub const OWNER_OFFSET: usize = 8;
    pub const COLLECTIONS_COUNT_OFFSET: usize = 40;

    pub fn is_registered(&self) -> bool {
        self.owner != Pubkey::default()
    }
}
