pub mod collection;
pub mod nft;
pub mod user;

pub use collection::*;
pub use nft::*;
pub use user::*;

use anchor_lang::prelude::*;

use crate::errors::RegistryError;

/// Token-metadata limits; anything longer is rejected by the metadata CPI anyway.
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_URI_LEN: usize = 200;

/// Width of an Anchor account discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

pub fn validate_name(name: &str) -> Result<()> {
    require!(!name.is_empty(), RegistryError::EmptyName);
    require!(name.len() <= MAX_NAME_LEN, RegistryError::NameTooLong);
    Ok(())
}

pub fn validate_symbol(symbol: &str) -> Result<()> {
    require!(symbol.len() <= MAX_SYMBOL_LEN, RegistryError::SymbolTooLong);
    Ok(())
}

pub fn validate_uri(uri: &str) -> Result<()> {
    require!(uri.len() <= MAX_URI_LEN, RegistryError::UriTooLong);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_limits() {
        assert!(validate_name("Genesis").is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert_eq!(
            validate_name(&"x".repeat(MAX_NAME_LEN + 1)).unwrap_err(),
            RegistryError::NameTooLong.into()
        );
        assert_eq!(validate_name("").unwrap_err(), RegistryError::EmptyName.into());
    }

    #[test]
    fn symbol_and_uri_limits() {
        assert!(validate_symbol("").is_ok());
        assert!(validate_symbol("GEN").is_ok());
        assert_eq!(
            validate_symbol("TOOLONGSYMBOL").unwrap_err(),
            RegistryError::SymbolTooLong.into()
        );
        assert!(validate_uri(&"u".repeat(MAX_URI_LEN)).is_ok());
        assert_eq!(
            validate_uri(&"u".repeat(MAX_URI_LEN + 1)).unwrap_err(),
            RegistryError::UriTooLong.into()
        );
    }
}
