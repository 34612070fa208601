//! In-process ledger for exercising the registry without a cluster.

pub mod ledger;
pub mod registry;
pub mod subsystem;

pub use ledger::{MemoryLedger, StoredAccount, UnitOfWork};
pub use registry::SandboxRegistry;
pub use subsystem::{
    load_authority_record, load_metadata, SimAuthorityRecord, SimMetadata, SimulatedTokenMetadata,
    SubsystemCall, TokenMetadata,
};
