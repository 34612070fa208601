//! RPC-backed registry client: builds, signs and submits the three
//! instructions, and exposes the query layer over the same connection.

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction;
use nft_registry::state::{CollectionArgs, CollectionRecord, NftArgs};
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::instructions;
use crate::pda::{self, CollectionAddresses, NftAddresses};
use crate::query::{Page, RegistryQuery};
use crate::rpc::RpcAccountSource;

pub struct RegistryClient {
    config: ClientConfig,
    source: RpcAccountSource,
}

impl RegistryClient {
    pub fn new(config: ClientConfig) -> Self {
        let source = RpcAccountSource::new(&config);
        Self { config, source }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn query(&self) -> RegistryQuery<&RpcAccountSource> {
        RegistryQuery::new(&self.source)
    }

    /// First page sized by the configured `page_size`.
    pub fn first_page(&self) -> Page {
        Page::first(self.config.page_size)
    }

    /// Signs with `payer` plus any extra signers and waits for confirmation.
    pub fn send(
        &self,
        payer: &Keypair,
        extra_signers: &[&Keypair],
        ixs: &[Instruction],
    ) -> ClientResult<Signature> {
        let rpc = self.source.client();
        let blockhash = rpc.get_latest_blockhash()?;

        let mut signers: Vec<&Keypair> = vec![payer];
        signers.extend_from_slice(extra_signers);
        let tx = Transaction::new_signed_with_payer(ixs, Some(&payer.pubkey()), &signers, blockhash);

        Ok(rpc.send_and_confirm_transaction(&tx)?)
    }

    pub fn register_user(&self, owner: &Keypair) -> ClientResult<(Signature, Pubkey)> {
        let ix = instructions::register_user(&owner.pubkey())?;
        let (user, _) = pda::user_record(&owner.pubkey())?;
        let signature = self.send(owner, &[], &[ix])?;
        info!(owner = %owner.pubkey(), %user, %signature, "register_user confirmed");
        Ok((signature, user))
    }

    /// Mints a collection under a fresh mint keypair.
    pub fn mint_collection(
        &self,
        owner: &Keypair,
        args: &CollectionArgs,
    ) -> ClientResult<(Signature, CollectionAddresses)> {
        let mint = Keypair::new();
        let ix = instructions::mint_collection(&owner.pubkey(), &mint.pubkey(), args)?;
        let addresses = CollectionAddresses::derive(&owner.pubkey(), &mint.pubkey())?;

        let signature = self.send(owner, &[&mint], &[ix])?;
        info!(collection = %addresses.record, mint = %addresses.mint, %signature, "mint_collection confirmed");
        Ok((signature, addresses))
    }

    /// Mints into the collection at `collection`, reading its owner and mint
    /// from the on-chain record.
    pub fn mint_nft_from_collection(
        &self,
        owner: &Keypair,
        collection: &Pubkey,
        args: &NftArgs,
    ) -> ClientResult<(Signature, NftAddresses)> {
        let record: CollectionRecord = self.query().get(collection)?;
        let mint = Keypair::new();
        let ix = instructions::mint_nft_from_collection(
            &owner.pubkey(),
            &record.owner,
            &record.mint,
            &mint.pubkey(),
            args,
        )?;
        let addresses = NftAddresses::derive(&owner.pubkey(), collection, &mint.pubkey())?;

        let signature = self.send(owner, &[&mint], &[ix])?;
        info!(%collection, nft = %addresses.record, %signature, "mint_nft_from_collection confirmed");
        Ok((signature, addresses))
    }
}
