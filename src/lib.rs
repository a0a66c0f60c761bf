//! Resolves the unlocking data for spending wallet-owned segwit v0 key-hash
//! outputs, both native p2wpkh and p2wpkh nested in p2sh.
//!
//! See [`Resolver::compute_input_script`] for the single-input entry point.
pub mod config;
mod error;
pub mod keys;
pub mod keystore;
pub mod resolver;
pub mod signer;
pub mod utils;

pub use bitcoin;
pub use bitcoin_hashes;
pub use secp256k1;

pub use crate::config::{Network, ResolverConfig};
pub use crate::error::Error;
pub use crate::keys::{PrivKeyTweaker, PrivateKey, TweakError};
pub use crate::keystore::{AddressType, KeyStore, ManagedAddress, MemoryKeyStore};
pub use crate::resolver::{InputScript, Resolver};
pub use crate::signer::{EcdsaWitnessSigner, WitnessSigner};

pub type Result<T> = std::result::Result<T, Error>;
