//! Instruction builders for the registry program.
//!
//! Account lists come from the program's generated `accounts::*` structs so
//! they cannot drift from the on-chain `#[derive(Accounts)]` definitions.

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar;
use anchor_lang::{system_program, InstructionData, ToAccountMetas};
use nft_registry::state::{CollectionArgs, NftArgs};

use crate::error::ClientResult;
use crate::pda::{self, CollectionAddresses, NftAddresses, TOKEN_METADATA_PROGRAM_ID};

pub fn register_user(owner: &Pubkey) -> ClientResult<Instruction> {
    let (user, _) = pda::user_record(owner)?;
    Ok(Instruction {
        program_id: nft_registry::ID,
        accounts: nft_registry::accounts::RegisterUser {
            owner: *owner,
            user,
            system_program: system_program::ID,
        }
        .to_account_metas(None),
        data: nft_registry::instruction::RegisterUser {}.data(),
    })
}

/// `collection_mint` is a fresh keypair that must co-sign the transaction.
pub fn mint_collection(
    owner: &Pubkey,
    collection_mint: &Pubkey,
    args: &CollectionArgs,
) -> ClientResult<Instruction> {
    let (user, _) = pda::user_record(owner)?;
    let addresses = CollectionAddresses::derive(owner, collection_mint)?;

    Ok(Instruction {
        program_id: nft_registry::ID,
        accounts: nft_registry::accounts::MintCollection {
            owner: *owner,
            user,
            collection_mint: addresses.mint,
            token_account: addresses.token_account,
            metadata: addresses.metadata,
            master_edition: addresses.master_edition,
            collection: addresses.record,
            collection_authority_record: addresses.authority_record,
            token_program: anchor_spl::token::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            token_metadata_program: TOKEN_METADATA_PROGRAM_ID,
            system_program: system_program::ID,
            rent: sysvar::rent::ID,
        }
        .to_account_metas(None),
        data: nft_registry::instruction::MintCollection {
            name: args.name.clone(),
            symbol: args.symbol.clone(),
            image_uri: args.image_uri.clone(),
            metadata_uri: args.metadata_uri.clone(),
        }
        .data(),
    })
}

/// `collection_owner` is the wallet that minted the collection; `nft_mint`
/// is a fresh keypair that must co-sign the transaction.
pub fn mint_nft_from_collection(
    owner: &Pubkey,
    collection_owner: &Pubkey,
    collection_mint: &Pubkey,
    nft_mint: &Pubkey,
    args: &NftArgs,
) -> ClientResult<Instruction> {
    let collection = CollectionAddresses::derive(collection_owner, collection_mint)?;
    let nft = NftAddresses::derive(owner, &collection.record, nft_mint)?;

    Ok(Instruction {
        program_id: nft_registry::ID,
        accounts: nft_registry::accounts::MintNftFromCollection {
            owner: *owner,
            collection: collection.record,
            collection_mint: collection.mint,
            collection_metadata: collection.metadata,
            collection_master_edition: collection.master_edition,
            collection_authority_record: collection.authority_record,
            nft_mint: nft.mint,
            token_account: nft.token_account,
            metadata: nft.metadata,
            master_edition: nft.master_edition,
            nft: nft.record,
            token_program: anchor_spl::token::ID,
            associated_token_program: anchor_spl::associated_token::ID,
            token_metadata_program: TOKEN_METADATA_PROGRAM_ID,
            system_program: system_program::ID,
            rent: sysvar::rent::ID,
        }
        .to_account_metas(None),
        data: nft_registry::instruction::MintNftFromCollection {
            name: args.name.clone(),
            image_uri: args.image_uri.clone(),
            metadata_uri: args.metadata_uri.clone(),
        }
        .data(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Discriminator;

    #[test]
    fn register_user_marks_owner_as_signer() {
        let owner = Pubkey::new_unique();
        let ix = register_user(&owner).unwrap();

        assert_eq!(ix.program_id, nft_registry::ID);
        assert_eq!(ix.accounts.len(), 3);
        assert_eq!(ix.accounts[0].pubkey, owner);
        assert!(ix.accounts[0].is_signer);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, pda::user_record(&owner).unwrap().0);
        assert_eq!(ix.data, nft_registry::instruction::RegisterUser::DISCRIMINATOR);
    }

    #[test]
    fn mint_collection_writes_record_and_mint() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let args = CollectionArgs {
            name: "Genesis".to_string(),
            symbol: "GEN".to_string(),
            image_uri: "https://x/c.png".to_string(),
            metadata_uri: "https://x/c.json".to_string(),
        };
        let ix = mint_collection(&owner, &mint, &args).unwrap();

        let mint_meta = ix.accounts.iter().find(|meta| meta.pubkey == mint).unwrap();
        assert!(mint_meta.is_writable);
        let record = pda::collection_record(&owner, &mint).unwrap().0;
        assert!(ix.accounts.iter().any(|meta| meta.pubkey == record && meta.is_writable));
        assert!(ix.data.starts_with(nft_registry::instruction::MintCollection::DISCRIMINATOR));
    }

    #[test]
    fn mint_nft_targets_collection_record_of_collection_owner() {
        let creator = Pubkey::new_unique();
        let minter = Pubkey::new_unique();
        let collection_mint = Pubkey::new_unique();
        let nft_mint = Pubkey::new_unique();
        let args = NftArgs {
            name: "Genesis #1".to_string(),
            image_uri: "https://x/1.png".to_string(),
            metadata_uri: "https://x/1.json".to_string(),
        };
        let ix =
            mint_nft_from_collection(&minter, &creator, &collection_mint, &nft_mint, &args).unwrap();

        let record = pda::collection_record(&creator, &collection_mint).unwrap().0;
        let nft = pda::nft_record(&record, &nft_mint).unwrap().0;
        assert_eq!(ix.accounts[1].pubkey, record);
        assert!(ix.accounts.iter().any(|meta| meta.pubkey == nft));
        assert!(ix.accounts.iter().any(|meta| meta.pubkey == nft_mint));
    }
}
