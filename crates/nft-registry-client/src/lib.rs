//! nft-registry-client
//!
//! Off-chain side of the NFT registry program:
//! - PDA bundles for every account an instruction touches
//! - instruction builders for `register_user`, `mint_collection` and
//!   `mint_nft_from_collection`
//! - the query layer: discriminator + offset filters over `getProgramAccounts`,
//!   with two-phase pagination
//! - [`RegistryClient`], which signs and submits those instructions over RPC
//! - a sandbox ledger that runs the instructions in-process

pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod instructions;
pub mod pda;
pub mod query;
pub mod rpc;
pub mod sandbox;
pub mod source;

pub use client::RegistryClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use query::{Page, RegistryQuery, MAX_FETCH_BATCH};
pub use rpc::RpcAccountSource;
pub use source::{AccountFilter, AccountSource, DataSlice, KeyedAccount};
