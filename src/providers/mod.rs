// Providers layer - Work performers shared by stores and middleware
//
// Providers hold secrets and perform the cryptographic work: password hashing
// for credential collections and bearer token verification.

pub mod crypto_provider;
pub mod token_provider;

pub use crypto_provider::CryptoProvider;
pub use token_provider::TokenProvider;
