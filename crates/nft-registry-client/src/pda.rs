//! Address bundles for the accounts each registry instruction touches.

use anchor_lang::prelude::Pubkey;
use anchor_spl::associated_token::get_associated_token_address;

pub use nft_registry::pda::*;

use crate::error::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionAddresses {
    pub record: Pubkey,
    pub mint: Pubkey,
    pub token_account: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
    pub authority_record: Pubkey,
}

impl CollectionAddresses {
    pub fn derive(owner: &Pubkey, mint: &Pubkey) -> ClientResult<Self> {
        let (record, _) = collection_record(owner, mint)?;
        Ok(Self {
            record,
            mint: *mint,
            token_account: get_associated_token_address(owner, mint),
            metadata: metadata_account(mint)?.0,
            master_edition: master_edition_account(mint)?.0,
            authority_record: collection_authority_record(mint, &record)?.0,
        })
    }

    pub fn all(&self) -> [Pubkey; 6] {
        [
            self.record,
            self.mint,
            self.token_account,
            self.metadata,
            self.master_edition,
            self.authority_record,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftAddresses {
    pub record: Pubkey,
    pub mint: Pubkey,
    pub token_account: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
}

impl NftAddresses {
    pub fn derive(owner: &Pubkey, collection: &Pubkey, mint: &Pubkey) -> ClientResult<Self> {
        Ok(Self {
            record: nft_record(collection, mint)?.0,
            mint: *mint,
            token_account: get_associated_token_address(owner, mint),
            metadata: metadata_account(mint)?.0,
            master_edition: master_edition_account(mint)?.0,
        })
    }

    pub fn all(&self) -> [Pubkey; 5] {
        [
            self.record,
            self.mint,
            self.token_account,
            self.metadata,
            self.master_edition,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_bundle_links_authority_to_record() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let addresses = CollectionAddresses::derive(&owner, &mint).unwrap();

        assert_eq!(addresses.record, collection_record(&owner, &mint).unwrap().0);
        assert_eq!(
            addresses.authority_record,
            collection_authority_record(&mint, &addresses.record).unwrap().0
        );
        assert_eq!(addresses, CollectionAddresses::derive(&owner, &mint).unwrap());
    }

    #[test]
    fn nft_bundle_addresses_are_distinct() {
        let owner = Pubkey::new_unique();
        let collection = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let addresses = NftAddresses::derive(&owner, &collection, &mint).unwrap();

        let mut all = addresses.all().to_vec();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 5);
    }
}
