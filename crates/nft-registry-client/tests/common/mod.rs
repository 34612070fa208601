#![allow(dead_code)]

use anchor_lang::prelude::Pubkey;
use nft_registry::errors::RegistryError;
use nft_registry::state::{CollectionArgs, NftArgs};
use nft_registry_client::pda::CollectionAddresses;
use nft_registry_client::sandbox::SandboxRegistry;

pub fn collection_args(name: &str) -> CollectionArgs {
    CollectionArgs {
        name: name.to_string(),
        symbol: "GEN".to_string(),
        image_uri: format!("https://arweave.net/{name}.png"),
        metadata_uri: format!("https://arweave.net/{name}.json"),
    }
}

pub fn nft_args(name: &str) -> NftArgs {
    NftArgs {
        name: name.to_string(),
        image_uri: format!("https://arweave.net/{name}.png"),
        metadata_uri: format!("https://arweave.net/{name}.json"),
    }
}

/// Registers `owner` and mints one collection for them.
pub fn registered_collection(
    registry: &mut SandboxRegistry,
    owner: &Pubkey,
    name: &str,
) -> CollectionAddresses {
    match registry.register_user(owner) {
        Ok(_) => {}
        Err(err) if err.is_registry(RegistryError::AlreadyExists) => {}
        Err(err) => panic!("register_user failed: {err}"),
    }
    registry
        .mint_collection(owner, &Pubkey::new_unique(), collection_args(name))
        .unwrap()
}
