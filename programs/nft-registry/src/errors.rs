use anchor_lang::prelude::*;

#[error_code]
pub enum RegistryError {
    #[msg("Account already exists at the derived address")]
    AlreadyExists,

    #[msg("Registry program is not an approved authority for this collection")]
    NotCollectionAuthority,

    #[msg("Token metadata rejected the collection membership verification")]
    CollectionVerificationFailed,

    #[msg("No off-curve address exists for the given seeds")]
    AddressExhausted,

    #[msg("Name is too long (max 32 bytes)")]
    NameTooLong,

    #[msg("Name must not be empty")]
    EmptyName,

    #[msg("Symbol is too long (max 10 bytes)")]
    SymbolTooLong,

    #[msg("URI is too long (max 200 bytes)")]
    UriTooLong,

    #[msg("Unauthorized: signer does not own this record")]
    Unauthorized,

    #[msg("Collection item counter overflowed")]
    CollectionFull,

    #[msg("User collection counter overflowed")]
    CounterOverflow,
}
