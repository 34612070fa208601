mod common;

use anchor_lang::prelude::Pubkey;
use nft_registry::state::{CollectionRecord, NftRecord};
use nft_registry_client::filters;
use nft_registry_client::pda::CollectionAddresses;
use nft_registry_client::sandbox::SandboxRegistry;
use nft_registry_client::{AccountFilter, Page, RegistryQuery};

use common::{nft_args, registered_collection};

struct Fixture {
    registry: SandboxRegistry,
    alice: Pubkey,
    bob: Pubkey,
    genesis: CollectionAddresses,
    other: CollectionAddresses,
    genesis_nfts: Vec<Pubkey>,
}

/// Alice owns `genesis` with three NFTs; Bob owns `other` with two.
fn fixture() -> Fixture {
    let mut registry = SandboxRegistry::default();
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let genesis = registered_collection(&mut registry, &alice, "genesis");
    let other = registered_collection(&mut registry, &bob, "other");

    let mut genesis_nfts = Vec::new();
    for i in 0..3 {
        let created = registry
            .mint_nft_from_collection(&alice, &genesis.record, &Pubkey::new_unique(), nft_args(&format!("g{i}")))
            .unwrap();
        genesis_nfts.push(created.record);
    }
    for i in 0..2 {
        registry
            .mint_nft_from_collection(&bob, &other.record, &Pubkey::new_unique(), nft_args(&format!("o{i}")))
            .unwrap();
    }
    genesis_nfts.sort();

    Fixture {
        registry,
        alice,
        bob,
        genesis,
        other,
        genesis_nfts,
    }
}

#[test]
fn nfts_in_collection_excludes_other_collections() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    assert_eq!(query.nft_addresses_in_collection(&f.genesis.mint).unwrap(), f.genesis_nfts);

    let records = query.nfts_in_collection(&f.genesis.mint, Page::first(10)).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .all(|(_, nft)| nft.collection == f.genesis.record && nft.collection_mint == f.genesis.mint));

    assert_eq!(query.nft_addresses_in_collection(&f.other.mint).unwrap().len(), 2);
}

#[test]
fn collection_mint_at_offset_40_selects_members() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    let raw = vec![
        filters::discriminator::<NftRecord>(),
        AccountFilter::memcmp(40, f.genesis.mint.to_bytes()),
    ];
    assert_eq!(query.addresses(&raw).unwrap(), f.genesis_nfts);

    let by_record = query
        .addresses(&filters::nfts_by_collection_record(&f.genesis.record))
        .unwrap();
    assert_eq!(by_record, f.genesis_nfts);
}

#[test]
fn collections_by_owner_only_sees_that_owner() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    let alice = query.collections_by_owner(&f.alice, Page::first(10)).unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].0, f.genesis.record);
    assert_eq!(alice[0].1.name, "genesis");

    let bob = query.collection_addresses_by_owner(&f.bob).unwrap();
    assert_eq!(bob, vec![f.other.record]);

    assert!(query.collection_addresses_by_owner(&Pubkey::new_unique()).unwrap().is_empty());
}

#[test]
fn two_phase_listing_matches_single_scan() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());
    let filter = filters::nfts_by_collection(&f.genesis.mint);

    let addresses = query.addresses(&filter).unwrap();
    let two_phase: Vec<(Pubkey, NftRecord)> = query.fetch_records(&addresses).unwrap();
    let single: Vec<(Pubkey, NftRecord)> = query.scan_records(&filter).unwrap();

    assert_eq!(two_phase, single);
}

#[test]
fn pages_cover_every_nft_once() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());
    let filter = filters::all_nfts();

    let mut page = Page::first(2);
    let mut seen = Vec::new();
    loop {
        let batch: Vec<(Pubkey, NftRecord)> = query.page(&filter, page).unwrap();
        if batch.is_empty() {
            break;
        }
        assert!(batch.len() <= 2);
        seen.extend(batch.into_iter().map(|(address, _)| address));
        page = page.next();
    }

    let mut expected = query.addresses(&filter).unwrap();
    expected.sort();
    assert_eq!(seen, expected);
    assert_eq!(seen.len(), 5);
}

#[test]
fn nfts_by_owner_follow_the_minter() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    let alice = query.nfts_by_owner(&f.alice, Page::first(10)).unwrap();
    assert_eq!(alice.len(), 3);
    assert!(alice.iter().all(|(_, nft)| nft.owner == f.alice));
    assert_eq!(query.nfts_by_owner(&f.bob, Page::first(10)).unwrap().len(), 2);
}

#[test]
fn users_and_single_records() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    assert_eq!(query.user_addresses().unwrap().len(), 2);
    assert_eq!(query.user(&f.alice).unwrap().collections_count, 1);

    let collection: CollectionRecord = query.get(&f.genesis.record).unwrap();
    assert_eq!(collection.item_count, 3);

    let collections: Vec<(Pubkey, CollectionRecord)> =
        query.scan_records(&filters::all_collections()).unwrap();
    assert_eq!(collections.len(), 2);
}

#[test]
fn token_accounts_never_match_registry_filters() {
    let f = fixture();
    let query = RegistryQuery::new(f.registry.ledger());

    // mints, holdings and metadata live in the ledger but under other owners
    assert!(f.registry.ledger().len() > 20);
    let all = query.addresses(&filters::all_nfts()).unwrap().len()
        + query.addresses(&filters::all_collections()).unwrap().len()
        + query.user_addresses().unwrap().len();
    assert_eq!(all, 5 + 2 + 2);
}

#[test]
fn pages_larger_than_fetch_batch_lose_nothing() {
    let mut registry = SandboxRegistry::default();
    let owner = Pubkey::new_unique();
    let collection = registered_collection(&mut registry, &owner, "bulk");
    for i in 0..150 {
        registry
            .mint_nft_from_collection(&owner, &collection.record, &Pubkey::new_unique(), nft_args(&format!("b{i}")))
            .unwrap();
    }
    let query = RegistryQuery::new(registry.ledger());

    let mut page = Page::first(120);
    let mut seen = Vec::new();
    loop {
        let batch = query.nfts_in_collection(&collection.mint, page).unwrap();
        if batch.is_empty() {
            break;
        }
        seen.extend(batch.into_iter().map(|(address, _)| address));
        page = page.next();
    }

    assert_eq!(seen.len(), 150);
    assert_eq!(seen, query.nft_addresses_in_collection(&collection.mint).unwrap());
}

#[test]
fn accounts_closed_between_phases_are_skipped() {
    let mut f = fixture();
    let addresses = RegistryQuery::new(f.registry.ledger())
        .nft_addresses_in_collection(&f.genesis.mint)
        .unwrap();
    let closed = addresses[1];
    f.registry.ledger_mut().remove(&closed);

    let records: Vec<(Pubkey, NftRecord)> = RegistryQuery::new(f.registry.ledger())
        .fetch_records(&addresses)
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|(address, _)| *address != closed));
}
