pub mod register_user;
pub mod mint_collection;
pub mod mint_nft_from_collection;

pub use register_user::*;
pub use mint_collection::*;
pub use mint_nft_from_collection::*;
